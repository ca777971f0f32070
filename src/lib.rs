pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod middleware;
pub mod realtime;
pub mod services;
