//! MonitorSSV Client - Library Root
//!
//! Re-exports all modules for the binary and integration tests.

pub mod adapters;
pub mod config;
pub mod context;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod usecases;
