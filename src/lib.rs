//! Stocklens Library
//!
//! Client-side inventory dashboard over the inventory REST API: cached
//! product collections, compound filtering, stock movement recording, report
//! aggregation with CSV export, and the profile/password panel. The backend
//! is consumed purely through its HTTP contract; all derived views are
//! computed from in-memory snapshots.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod client;
pub mod config;
pub mod errors;
pub mod inventory;
pub mod models;
pub mod profile;
pub mod render;
pub mod reports;
pub mod stock;

pub use client::ApiClient;
pub use errors::{ClientError, Result};
