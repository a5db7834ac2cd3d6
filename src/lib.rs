pub mod core {
    pub mod command;
    pub mod domain;
    pub mod events;
    pub mod library;
    pub mod repository;
}

pub mod utils {
    pub mod date;
    pub mod ddb;
    pub mod logs;
    pub(crate) mod memory;
}

pub mod assets;
pub mod patrons;
pub mod checkout;
pub mod hold;
pub mod circulation;
pub mod gateway;
