pub mod password;
pub mod token_service;
pub mod user_store;

#[cfg(test)]
pub mod memory_store;
