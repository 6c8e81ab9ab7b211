//! Dataset decoding with format, encoding and delimiter auto-detection.
//!
//! ARCAD extracts come either as workbooks (one sheet, header on the first
//! row) or as delimited text exported from them. Both decode into a
//! [`Table`]. No ARCAD-specific logic here.

pub mod xlsx;

use csv::{ReaderBuilder, Trim};

use crate::error::{ParseError, ParseResult};
use crate::models::{CellValue, Table};

pub use xlsx::{is_workbook, parse_workbook};

/// How a payload was decoded
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadFormat {
    /// Delimited text
    Csv { encoding: String, delimiter: char },
    /// Spreadsheet, first worksheet
    Workbook { sheet: String },
}

impl std::fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadFormat::Csv { encoding, delimiter } => {
                write!(f, "CSV ({}, delimiter '{}')", encoding, format_delimiter(*delimiter))
            }
            PayloadFormat::Workbook { sheet } => write!(f, "workbook (sheet '{}')", sheet),
        }
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParsedDataset {
    /// Decoded table
    pub table: Table,
    /// Detected format
    pub format: PayloadFormat,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // UTF-8 and anything unknown: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };
    match decoded.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ';';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

/// Parse delimited text into a table.
///
/// Cells are trimmed, quotes handled by the CSV reader, blank lines skipped.
/// Rows shorter than the header are padded, longer ones truncated.
///
/// # Example
/// ```ignore
/// use arcadgraph::parser::parse_csv_str;
///
/// let table = parse_csv_str("LST_CELTTY;LST_CTYPE\nO;*PGM", ';').unwrap();
/// assert_eq!(table.len(), 1);
/// ```
pub fn parse_csv_str(content: &str, delimiter: char) -> ParseResult<Table> {
    if content.trim().is_empty() {
        return Err(ParseError::EmptyFile);
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(ParseError::NoHeaders);
    }

    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.iter().all(|v| v.is_empty()) {
            continue;
        }
        table.push_row(record.iter().map(CellValue::from).collect());
    }

    Ok(table)
}

fn csv_error(err: csv::Error) -> ParseError {
    ParseError::Csv {
        line: err.position().map(|p| p.line()).unwrap_or(0),
        message: err.to_string(),
    }
}

/// Parse a payload with auto-detection of format, encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> ParseResult<ParsedDataset> {
    if bytes.is_empty() {
        return Err(ParseError::EmptyFile);
    }

    if is_workbook(bytes) {
        let (table, sheet) = parse_workbook(bytes)?;
        return Ok(ParsedDataset {
            table,
            format: PayloadFormat::Workbook { sheet },
        });
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    let table = parse_csv_str(&content, delimiter)?;

    Ok(ParsedDataset {
        table,
        format: PayloadFormat::Csv { encoding, delimiter },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let table = parse_csv_str("LST_CELTTY;LST_CTYPE\nO;*PGM\nM;RPGLE", ';').unwrap();

        assert_eq!(table.columns(), ["LST_CELTTY", "LST_CTYPE"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][1], CellValue::text("*PGM"));
        assert_eq!(table.rows()[1][0], CellValue::text("M"));
    }

    #[test]
    fn test_quoted_values() {
        let csv = "name;value\n\"Alice\";\"Hello; World\"";
        let table = parse_csv_str(csv, ';').unwrap();

        assert_eq!(table.rows()[0][0], CellValue::text("Alice"));
        assert_eq!(table.rows()[0][1], CellValue::text("Hello; World"));
    }

    #[test]
    fn test_empty_lines_skipped() {
        let table = parse_csv_str("a;b\n1;2\n\n3;4\n", ';').unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_missing_values() {
        let table = parse_csv_str("a;b;c\n1;;3\n4", ';').unwrap();

        assert_eq!(table.rows()[0][1], CellValue::Empty);
        assert_eq!(table.rows()[1][2], CellValue::Empty);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let table = parse_csv_str("a;b\n1;2;3;4", ';').unwrap();
        assert_eq!(table.rows()[0].len(), 2);
    }

    #[test]
    fn test_cells_are_trimmed() {
        let table = parse_csv_str("a,b\n  X  , *PGM ", ',').unwrap();
        assert_eq!(table.rows()[0][0], CellValue::text("X"));
        assert_eq!(table.rows()[0][1], CellValue::text("*PGM"));
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_csv_str("", ';'), Err(ParseError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b""), Err(ParseError::EmptyFile)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_auto_parse() {
        let csv = "OXR_FROM_TYPE,OXR_TO_TYPE\n*PGM,*FILE\n*PGM,*DTAARA";
        let parsed = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(
            parsed.format,
            PayloadFormat::Csv { encoding: "utf-8".into(), delimiter: ',' }
        );
        assert_eq!(parsed.table.len(), 2);
    }

    #[test]
    fn test_bom_is_stripped() {
        let bytes = "\u{feff}LST_CELTTY;LST_CAPP\nO;APP1".as_bytes();
        let parsed = parse_bytes_auto(bytes).unwrap();
        assert_eq!(parsed.table.columns()[0], "LST_CELTTY");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }
}
