//! Human-readable stream summaries and CSV export.

pub mod report;

pub use report::{
    ReportError, StreamSummary, format_sig, percent_removal, write_records, write_records_to_path,
    write_stream_table, write_stream_table_to_path,
};
