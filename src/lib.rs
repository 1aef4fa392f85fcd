pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod links;
pub mod middleware;
pub mod negotiation;
pub mod pagination;
pub mod shaping;
pub mod sorting;
