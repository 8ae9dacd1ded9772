//! # bundlekit-charm
//!
//! Per-charm knowledge consumed by the bundle transformation core.
//!
//! Handles:
//! - **Classify**: which option key carries the origin for a given service.
//! - **Origin**: target parsing, native release table, origin pointer derivation.
//! - **Locator**: charm store and GitHub URL construction per channel.
//! - **Descriptor**: the narrow trait through which the core reaches all of the above.
//! - **Catalog**: the base OpenStack service set used by `render --generate`.
//! - **Store**: charm store metadata queries over HTTP.

pub mod catalog;
pub mod classify;
pub mod descriptor;
pub mod locator;
pub mod origin;
pub mod store;

pub use classify::OriginClass;
pub use descriptor::{CharmDescriptor, OriginAssignment, StaticCharmDescriptor};
pub use origin::Target;
pub use store::{CharmStoreClient, MetadataSource};
