pub mod processor;

pub use processor::{DocumentProcessor, DocumentReport, TextStats, UploadReport};
