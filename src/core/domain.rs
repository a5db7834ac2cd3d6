use serde::{Deserialize, Serialize};

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable : Sync + Send {
    fn id(&self) -> String;
    fn version(&self) -> i64;
}

pub const DEFAULT_CHECKOUT_LOAN_DAYS: i64 = 30;

// Configuration abstracts config options for the circulation desk of a branch
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub branch_id: String,
    pub checkout_loan_days: i64,
}

impl Configuration {
    pub fn new(branch_id: &str) -> Self {
        Configuration {
            branch_id: branch_id.to_string(),
            checkout_loan_days: DEFAULT_CHECKOUT_LOAN_DAYS,
        }
    }

    pub fn with_checkout_loan_days(mut self, days: i64) -> Self {
        self.checkout_loan_days = days;
        self
    }
}
