//! Cashier BOPIS plugin library.
//!
//! This crate provides the plugin's HTTP surface, upstream clients and shipping
//! rate aggregation as a library, allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod providers;
pub mod routes;
pub mod services;
pub mod state;
