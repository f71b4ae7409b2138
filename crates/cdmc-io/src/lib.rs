//! Sequence loading and result writing for the cdmc pipeline.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{Dataset, ExperimentName, SequenceId};
pub use error::IoError;
pub use reader::{CsvSequenceReader, SequenceSource};
pub use writer::ResultWriter;
