pub mod row;
pub mod sink;

pub use sink::{ExportSink, ExportStatus};
