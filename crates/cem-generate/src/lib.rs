//! The Generation Coordinator: resolves the file set for
//! a workspace, fans analysis out over a bounded worker pool, merges
//! design tokens and demos, propagates inheritance, and serializes a
//! normalized manifest.
//!
//! This crate is the one place that owns parallelism across files;
//! `cem-analyzer` stays single-file and synchronous so it can be driven
//! either from here or, file-at-a-time, from the dev server's transform
//! and regeneration paths.

pub mod coordinator;
pub mod error;

pub use coordinator::{Coordinator, DemoDiscoveryOptions, DesignTokensSpec, GenerateOptions};
pub use error::{FileFailure, GenerateError, Result};
