pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod observer;
pub mod routes;
pub mod services;
pub mod state;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
