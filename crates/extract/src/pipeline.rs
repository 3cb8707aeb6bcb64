use std::path::Path;

use thiserror::Error;

use crate::delimited::{DelimitedError, DelimitedExtractor};
use crate::narrative::NarrativeExtractor;
use crate::types::Extraction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementFormat {
    Delimited,
    Narrative,
}

impl StatementFormat {
    /// Decide the extractor from the file extension, before any read.
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "csv" | "tsv" => Ok(StatementFormat::Delimited),
            "txt" | "text" => Ok(StatementFormat::Narrative),
            _ => Err(ExtractError::UnsupportedFormat(ext)),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("delimited parsing failed: {0}")]
    Delimited(#[from] DelimitedError),
    #[error("unsupported file type '.{0}': use .csv, .tsv, or .txt (for PDF, run pdftotext)")]
    UnsupportedFormat(String),
}

/// Read one statement file and run the extractor its extension selects.
/// There is no fallback between formats: a `.csv` that fails the
/// delimited parse never gets a second chance as narrative text.
pub fn extract_file(path: &Path) -> Result<Extraction, ExtractError> {
    let format = StatementFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    extract_str(&text, format)
}

/// Run the extractor for an already-loaded statement body.
pub fn extract_str(text: &str, format: StatementFormat) -> Result<Extraction, ExtractError> {
    match format {
        StatementFormat::Delimited => Ok(DelimitedExtractor::extract(text)?),
        StatementFormat::Narrative => Ok(NarrativeExtractor::extract_text(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn extension_selects_format() {
        let cases = [
            ("statement.csv", StatementFormat::Delimited),
            ("statement.tsv", StatementFormat::Delimited),
            ("statement.txt", StatementFormat::Narrative),
            ("statement.text", StatementFormat::Narrative),
            ("STATEMENT.CSV", StatementFormat::Delimited),
        ];
        for (name, expected) in cases {
            assert_eq!(StatementFormat::from_path(Path::new(name)).unwrap(), expected);
        }
    }

    #[test]
    fn unknown_extension_is_rejected_with_a_hint() {
        let err = StatementFormat::from_path(Path::new("statement.pdf")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unsupported file type '.pdf'"));
        assert!(msg.contains("pdftotext"));
    }

    #[test]
    fn missing_extension_is_rejected() {
        assert!(StatementFormat::from_path(Path::new("statement")).is_err());
    }

    #[test]
    fn extract_file_runs_the_delimited_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.csv");
        fs::write(
            &path,
            "date,description,amount\n2024-01-01,Uber ride,100\n2024-01-01,Swiggy order,200\n",
        )
        .unwrap();

        let extraction = extract_file(&path).unwrap();
        assert_eq!(extraction.transactions.len(), 2);
        assert!(extraction.skipped.is_empty());
        assert_eq!(extraction.transactions[0].description, "Uber ride");
    }

    #[test]
    fn extract_file_runs_the_narrative_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.txt");
        fs::write(&path, "01/01/24 UPI-SWIGGY BANGALORE 200.00 4,512.10\n").unwrap();

        let extraction = extract_file(&path).unwrap();
        assert_eq!(extraction.transactions.len(), 1);
        assert_eq!(extraction.transactions[0].description, "UPI-SWIGGY BANGALORE");
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        let err = extract_file(Path::new("/nonexistent/statement.csv")).unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }

    #[test]
    fn non_utf8_bytes_are_replaced_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.csv");
        let mut body = b"date,description,amount\n2024-01-01,Caf".to_vec();
        body.push(0xe9); // latin-1 e-acute
        body.extend_from_slice(b" Coffee,150\n");
        fs::write(&path, body).unwrap();

        let extraction = extract_file(&path).unwrap();
        assert_eq!(extraction.transactions.len(), 1);
        assert!(extraction.transactions[0].description.contains("Coffee"));
    }
}
