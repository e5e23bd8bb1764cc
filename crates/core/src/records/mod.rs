// Record store: parsed individuals and families, plus the readers that build it.

mod entity;
mod gedcom;
mod store;
mod table;

pub use entity::{Family, Gender, Individual, LifeEvent, ParentSlot};
pub use store::{RecordFormat, RecordSource, RecordStore};
