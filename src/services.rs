pub mod ingest_service;

pub use ingest_service::{build_dataset, IngestError, IngestService, PreparedRun};
