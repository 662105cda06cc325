pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod helpers;
pub mod middleware;
pub mod models;
pub mod schemas;
