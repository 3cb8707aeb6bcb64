pub mod delimited;
pub mod narrative;
pub mod pipeline;
pub mod types;

pub use delimited::{DelimitedError, DelimitedExtractor};
pub use narrative::NarrativeExtractor;
pub use pipeline::{extract_file, extract_str, ExtractError, StatementFormat};
pub use types::{Extraction, SkippedRow};
