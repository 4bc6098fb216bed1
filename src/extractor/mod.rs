pub mod block;
pub mod document;
pub mod file_extractor;
pub mod naming;
pub mod output_manager;
pub mod table;

pub use block::{extract, Extraction, Grid, MarkerTrigger, Trigger};
pub use document::Document;
pub use file_extractor::{ExtractionProgress, TableExtractor};
pub use naming::{short_name, short_name_for_path, DEFAULT_BOUNDARY_OUTPUT};
pub use output_manager::{DocumentOutcome, ExtractionReport, OutputManager};
pub use table::{extract_table, TableKind};
