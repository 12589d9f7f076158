//! Storage sinks for generated banking rows.
//!
//! The [`Sink`] trait is the only surface the generators write through. A
//! SQLite implementation backs real runs; [`MemorySink`] backs tests and dry
//! runs.

pub mod error;
pub mod memory;
pub mod sink;
pub mod sqlite;

pub use error::{SinkError, SinkResult};
pub use memory::{MemorySink, MemoryTables};
pub use sink::Sink;
pub use sqlite::SqliteSink;
