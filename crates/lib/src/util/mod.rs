//! Shared utilities.
//!
//! Test helpers for building in-memory projects.

#[cfg(test)]
pub mod testutil;
