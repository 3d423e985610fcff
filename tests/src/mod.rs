#[cfg(test)]
pub mod claim_http_tests;
#[cfg(test)]
pub mod eligibility_http_tests;
#[cfg(test)]
pub mod utils;
