//! Core library for the `volley` CLI.
//!
//! This crate provides the internal building blocks used by the binary: CLI
//! argument types, the request worker loop, shared run metrics, and the run
//! controller. The primary user-facing interface is the `volley` command-line
//! application; library APIs may evolve as the CLI grows.
pub mod app;
pub mod args;
pub mod entry;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod payload;
pub mod shutdown;
