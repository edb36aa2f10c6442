//! File I/O, validation, and serialization for the refrain pipeline.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::RunName;
pub use error::IoError;
pub use reader::{SegmentReader, SsmReader};
pub use writer::{FamilyRecord, ResultWriter};
