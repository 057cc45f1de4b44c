pub mod auth_service;
pub mod employee_service;
pub mod item_service;
pub mod order_service;
