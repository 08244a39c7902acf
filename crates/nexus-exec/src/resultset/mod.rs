//! Tuple representation flowing through the pipeline
//!
//! Row form: a [`Record`] of [`Entry`] cells addressed by symbol-table slot.
//! Columnar form: a [`DataChunk`] of named columns joined by vid.

pub mod chunk;
pub mod column;
pub mod entry;
pub mod record;

pub use chunk::DataChunk;
pub use column::{ColumnVector, DataType, StringColumn, StringHandle};
pub use entry::{Entry, EntryType, NULL_TEXT, NodeRef, PathRef, RelpRef};
pub use record::{Record, SharedRecord};
