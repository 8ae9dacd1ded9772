//! # bundlekit-compose
//!
//! Transformation engine for deployment bundles.
//!
//! Handles:
//! - **Bundle / Relation / Document**: the in-memory document model and its YAML shape.
//! - **Graph**: undirected relation adjacency over service names.
//! - **Reducer**: subset selection with one-hop closure and relation pruning.
//! - **Inherit**: flattening a target through its chain of variants.
//! - **Cascade**: layering override documents onto a base bundle.
//! - **Render**: the full render pipeline (locate, origin, HA, overrides).

pub mod bundle;
pub mod cascade;
pub mod document;
pub mod graph;
pub mod ha;
pub mod inherit;
pub mod reducer;
pub mod relation;
pub mod render;

pub use bundle::{Bundle, ServiceDef, Transformed};
pub use document::{Document, Variant, VariantDocument};
pub use relation::{Endpoint, Relation};
