// Lineage engine: bounded ancestor traversal, collapse detection, layout.

mod builder;
mod config;
mod graph;
mod layout;
mod registry;

pub use builder::build_ancestry;
pub use config::{TraversalConfig, DEFAULT_CAPACITY};
pub use graph::{AncestorGraph, CollapseLink, LineagePath, Occurrence};
pub use layout::{assign, Coordinate, LayoutAssigner, LayoutConfig};
pub use registry::{CollapseRegistry, RegistryOutcome};
