// Leto shared type definitions
// Each submodule defines types used across the crate.

pub mod config;
pub mod errors;
pub mod extraction;
pub mod reading;
pub mod upload;
