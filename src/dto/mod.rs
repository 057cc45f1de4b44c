pub mod auth;
pub mod employees;
pub mod items;
pub mod orders;
