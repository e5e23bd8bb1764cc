pub mod error;
pub mod lineage;
pub mod records;

pub use error::{LineageError, Result};
pub use lineage::{
    build_ancestry, AncestorGraph, CollapseLink, Coordinate, LayoutConfig, LineagePath,
    Occurrence, TraversalConfig, DEFAULT_CAPACITY,
};
pub use records::{
    Family, Gender, Individual, LifeEvent, ParentSlot, RecordFormat, RecordSource, RecordStore,
};
