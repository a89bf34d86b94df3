//! Layout and connection routing for industrial-cluster synergy maps.
//!
//! Geographic company locations are projected onto a fixed square surface, spread apart,
//! relaxed with a spring/repulsion simulation and then wired together with routed synergy
//! connections. Everything here is synchronous and deterministic; the viewer in the binary
//! only reads the resulting [`AtlasIndex`].

pub mod atlas;
pub mod cache;
pub mod cluster;
pub mod config;
pub mod connections;
pub mod dataset;
pub mod error;
pub mod geo;
pub mod index;
pub mod layout;
pub mod node_id;

pub use atlas::Atlas;
pub use cache::LayoutCache;
pub use cluster::{ClusterLayout, Company, LayoutMode};
pub use config::LayoutConfig;
pub use connections::{
    BundleGeometry, BundleState, Connection, ConnectionGroups, ConnectionKind, ConnectionPayload,
    ConnectionViewMode, RoutingMode,
};
pub use dataset::{ClusterDefinition, Dataset, SynergyRecord, SynergyState};
pub use error::{DatasetError, Result};
pub use geo::{GeoBounds, GeoLocation, Position3};
pub use index::{AtlasIndex, NodeEntry};
pub use layout::ClusterPlane;
pub use node_id::{NodeKind, NodeRef};
