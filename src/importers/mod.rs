// Import module - exchange CSV exports (heuristic CTC converter, header-mapped loader)

pub mod ctc_converter;
pub mod header_csv;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::path::Path;
use tracing::{debug, info};

use crate::error::CtcError;

pub use ctc_converter::{
    normalize_to_ctc_csv, Conversion, ConverterDefaults, CtcConverter, CtcRow, SkipReason,
    SkippedRow, CTC_HEADER, SAMPLE_CTC_CSV,
};
pub use header_csv::{load_transactions, ColumnMapping};

pub(crate) const EMPTY_CSV_MESSAGE: &str = "CSV file is empty or has no data rows";

/// Read a CSV export from disk as text.
///
/// UTF-8 is tried first (a BOM is stripped); exports that are not valid UTF-8
/// are decoded as Windows-1252, which is what spreadsheet tools tend to emit.
pub fn read_csv_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    info!("Reading CSV file: {:?}", path);

    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;

    let (decoded, _, had_errors) = UTF_8.decode(&bytes);
    if !had_errors {
        return Ok(decoded.into_owned());
    }

    debug!("{:?} is not valid UTF-8, decoding as Windows-1252", path);
    let (decoded, _, _) = WINDOWS_1252.decode(&bytes);
    Ok(decoded.into_owned())
}

/// One data row of a CSV input, with its line number in the original text
#[derive(Debug)]
pub(crate) struct InputRow {
    pub line: usize,
    pub record: std::result::Result<StringRecord, String>,
}

/// A CSV input split into its header and data rows
#[derive(Debug)]
pub(crate) struct CsvInput {
    pub headers: StringRecord,
    pub rows: Vec<InputRow>,
}

/// Split raw CSV text into a header and data rows.
///
/// Blank lines are ignored. Fails with a format error when there is no header
/// or no data row.
pub(crate) fn read_csv_input(raw: &str) -> std::result::Result<CsvInput, CtcError> {
    let kept: Vec<(usize, &str)> = raw
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, line))
        .collect();

    if kept.len() < 2 {
        return Err(CtcError::FormatError(EMPTY_CSV_MESSAGE.to_string()));
    }

    let cleaned = kept
        .iter()
        .map(|(_, line)| *line)
        .collect::<Vec<_>>()
        .join("\n");

    let mut reader = ReaderBuilder::new()
        .flexible(true) // Allow variable number of columns
        .trim(Trim::All)
        .from_reader(cleaned.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| CtcError::FormatError(format!("Failed to read CSV headers: {}", e)))?
        .clone();

    debug!("CSV headers: {:?}", headers);

    let original_line = |cleaned_line: Option<u64>| -> usize {
        cleaned_line
            .and_then(|l| usize::try_from(l).ok())
            .and_then(|l| l.checked_sub(1))
            .and_then(|idx| kept.get(idx))
            .map(|(line, _)| *line)
            .unwrap_or(0)
    };

    let rows: Vec<InputRow> = reader
        .records()
        .map(|result| match result {
            Ok(record) => InputRow {
                line: original_line(record.position().map(|p| p.line())),
                record: Ok(record),
            },
            Err(e) => InputRow {
                line: original_line(e.position().map(|p| p.line())),
                record: Err(e.to_string()),
            },
        })
        .collect();

    if rows.is_empty() {
        return Err(CtcError::FormatError(EMPTY_CSV_MESSAGE.to_string()));
    }

    Ok(CsvInput { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_csv_input_skips_blank_lines_and_keeps_line_numbers() {
        let input =
            read_csv_input("\n  \ndate,type\n\n2024-01-01,buy\n   \n2024-01-02,sell\n").unwrap();

        assert_eq!(input.headers.get(0), Some("date"));
        let lines: Vec<usize> = input.rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![5, 7]);
    }

    #[test]
    fn test_read_csv_input_trims_fields() {
        let input = read_csv_input("a, b\n 1 , x \n").unwrap();
        let record = input.rows[0].record.as_ref().unwrap();
        assert_eq!(record.get(0), Some("1"));
        assert_eq!(record.get(1), Some("x"));
        assert_eq!(input.headers.get(1), Some("b"));
    }

    #[test]
    fn test_read_csv_input_rejects_empty_and_header_only() {
        for raw in ["", "   \n\n", "date,type,asset,amount,price", "date,type\n\n  \n"] {
            match read_csv_input(raw) {
                Err(CtcError::FormatError(msg)) => assert_eq!(msg, EMPTY_CSV_MESSAGE),
                other => panic!("expected format error for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_read_csv_file_decodes_utf8_with_bom() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"\xEF\xBB\xBFdate,asset\n2024-01-01,BTC\n").unwrap();

        let text = read_csv_file(file.path()).unwrap();
        assert!(text.starts_with("date,asset"));
    }

    #[test]
    fn test_read_csv_file_falls_back_to_windows_1252() {
        let mut file = NamedTempFile::new().unwrap();
        // 0xE9 is 'é' in Windows-1252 and invalid on its own in UTF-8
        file.write_all(b"date,note\n2024-01-01,caf\xE9\n").unwrap();

        let text = read_csv_file(file.path()).unwrap();
        assert!(text.contains("café"));
    }
}
