pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod mappers;
pub mod middleware;
pub mod models;
pub mod proxy;
pub mod response;
pub mod routes;
pub mod sequence;
pub mod services;
pub mod state;
