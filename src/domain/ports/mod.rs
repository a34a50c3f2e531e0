pub mod account_repository;
pub mod admin_repository;
pub mod completion_port;
