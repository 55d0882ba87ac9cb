//! # Wave Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Determinism test harness
//! - Party and generator fixtures
//! - Survival statistics over many seeds
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod balance;
pub mod determinism;
pub mod fixtures;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
