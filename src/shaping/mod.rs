pub mod error;
pub mod field_table;
pub mod registry;
pub mod shaped;

pub use error::ShapeError;
pub use field_table::{Field, FieldSelection, FieldTable, Shape, ID_FIELD};
pub use registry::FieldTableRegistry;
pub use shaped::{ShapedObject, LINKS_KEY};
