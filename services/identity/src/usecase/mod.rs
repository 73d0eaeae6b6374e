pub mod account;
pub mod credential;
pub mod password;
pub mod token;
