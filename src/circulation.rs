pub mod command;
pub mod domain;
pub mod dto;
pub mod factory;
#[cfg(test)]
pub(crate) mod testing;
