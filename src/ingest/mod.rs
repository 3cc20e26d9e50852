/// Reading ingestion.
///
/// Submodules:
/// - `sensors` — validates device submissions and turns them into classified records.
/// - `batch` — runs newline-delimited submissions through `sensors` and annotates the output.

pub mod batch;
pub mod sensors;
