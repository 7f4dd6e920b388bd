//! Typed, polymorphic representation of a Custom Elements Manifest
//! document, its invariants, and the query API tooling runs against a
//! loaded package.

pub mod config;
pub mod error;
pub mod model;
pub mod package_json;
pub mod query;

pub use error::{ModelError, Result};
pub use model::*;
pub use query::{PackageQuery, Renderable, SearchHit, TagContext, TreeNode};
