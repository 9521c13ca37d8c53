//! Data module - entity-keyed tables and CSV loading

pub mod annotation;
pub mod entity;
mod frame;
mod loader;
pub mod normal;

pub use annotation::{AnnotationRow, AnnotationTable};
pub use entity::{decode_entity_id, display_code, EntityId};
pub use frame::EntityFrame;
pub use loader::{read_csv, DataLoader, LoaderError};
pub use normal::{NormalData, TableRow};
