pub mod config;
pub mod context;
pub mod dtos;
pub mod patterns;
