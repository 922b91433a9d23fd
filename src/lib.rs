//! SURGE — Momentum Market Scanner and Quote Service
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod cache;
pub mod provider;
pub mod engine;
pub mod server;
