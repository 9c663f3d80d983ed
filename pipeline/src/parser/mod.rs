//! Source table reader with encoding fallback.
//!
//! IPEDS extracts are published as comma-separated files, mostly UTF-8
//! (sometimes with a BOM) but a few years ship as Windows-1252. Every
//! source is decoded as UTF-8 first and re-decoded as Windows-1252 when
//! that fails. All cells are kept as raw text; empty cells become `Null`.

use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::error::{SourceError, SourceResult};
use crate::models::{Record, Table};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text encoding a source was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceEncoding {
    /// UTF-8, BOM stripped if present.
    Utf8,
    /// Windows-1252 (the WHATWG `latin1` encoding).
    Windows1252,
}

impl SourceEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Windows1252 => "windows-1252",
        }
    }
}

/// Source metadata reported by a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub file: String,
    pub encoding: String,
    pub row_count: usize,
    pub headers: Vec<String>,
}

/// Result of reading a source file.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed table, named after the file.
    pub table: Table,
    /// Encoding that decoded successfully.
    pub encoding: SourceEncoding,
}

impl ParseResult {
    pub fn info(&self) -> SourceInfo {
        SourceInfo {
            file: self.table.name.clone(),
            encoding: self.encoding.name().to_string(),
            row_count: self.table.len(),
            headers: self.table.headers.clone(),
        }
    }
}

/// Decode bytes, preferring UTF-8 and falling back to Windows-1252.
pub fn decode_content(bytes: &[u8], path: &Path) -> SourceResult<(String, SourceEncoding)> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Some(text) = encoding_rs::UTF_8.decode_without_bom_handling_and_without_replacement(body) {
        return Ok((text.into_owned(), SourceEncoding::Utf8));
    }

    encoding_rs::WINDOWS_1252
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| (text.into_owned(), SourceEncoding::Windows1252))
        .ok_or_else(|| SourceError::Decode {
            path: path.to_path_buf(),
            tried: "utf-8, windows-1252".to_string(),
        })
}

/// Read and parse a source file.
pub fn read_source(path: &Path) -> SourceResult<ParseResult> {
    let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bytes(&bytes, path)
}

/// Parse raw bytes; `path` names the table and is used in errors.
pub fn parse_bytes(bytes: &[u8], path: &Path) -> SourceResult<ParseResult> {
    let (content, encoding) = decode_content(bytes, path)?;
    let table = parse_str(&content, path)?;
    Ok(ParseResult { table, encoding })
}

/// Parse decoded CSV text.
///
/// Short rows are padded with `Null`; rows longer than the header are an
/// error, as are duplicate header names.
pub fn parse_str(content: &str, path: &Path) -> SourceResult<Table> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    if content.trim().is_empty() {
        return Err(SourceError::EmptyFile(path.to_path_buf()));
    }

    let parse_error = |message: String| SourceError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| parse_error(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    for (i, header) in headers.iter().enumerate() {
        if headers[..i].contains(header) {
            return Err(parse_error(format!("duplicate column '{}'", header)));
        }
    }

    let mut table = Table::new(name, headers);

    for (row_idx, row) in reader.records().enumerate() {
        let line = row_idx + 2; // +1 for 0-index, +1 for header
        let row = row.map_err(|e| parse_error(e.to_string()))?;

        if row.len() == 1 && row.get(0).is_some_and(|v| v.trim().is_empty()) {
            continue;
        }
        if row.len() > table.headers.len() {
            return Err(parse_error(format!(
                "line {}: expected {} fields, found {}",
                line,
                table.headers.len(),
                row.len()
            )));
        }

        let record: Record = table
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let cell = match row.get(i).map(str::trim) {
                    Some(v) if !v.is_empty() => Value::String(v.to_string()),
                    _ => Value::Null,
                };
                (header.clone(), cell)
            })
            .collect();

        table.records.push(record);
    }

    Ok(table)
}
