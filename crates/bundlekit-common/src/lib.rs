//! # bundlekit-common
//!
//! Shared error definitions, warnings, configuration models, and constants
//! used across the entire bundlekit workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the primitives that all other crates build upon.

pub mod config;
pub mod constants;
pub mod error;
pub mod warning;
