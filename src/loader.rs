// 📂 Record Loader - tabular bytes → RawRecords
//
// Steps:
//   1. Resolve the text encoding (first configured encoding that decodes cleanly)
//   2. Detect whether the first row is a header (recognized-column heuristic)
//   3. Check required columns, drop unknown ones with a warning
//   4. Emit rows in chunks, preserving input order

use crate::columns::{column_key, ColumnRegistry};
use crate::config::LoaderConfig;
use crate::error::{ReconError, Result};
use crate::record::RawRecord;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use encoding_rs::Encoding;
use serde::Serialize;
use std::fs;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ============================================================================
// LOAD REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DecodedInput {
    pub text: String,
    /// Canonical name of the encoding that worked (e.g. "UTF-8")
    pub encoding: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub records: Vec<RawRecord>,
    pub encoding: String,
    /// True when the first row was treated as data
    pub headerless: bool,
    /// Canonical columns kept, in input order
    pub columns: Vec<String>,
    /// Non-fatal findings (unknown columns, duplicate headers)
    pub warnings: Vec<String>,
    pub chunks: usize,
}

impl LoadReport {
    pub fn summary(&self) -> String {
        format!(
            "{} rows in {} chunk(s), encoding {}, {}, {} column(s) kept, {} warning(s)",
            self.records.len(),
            self.chunks,
            self.encoding,
            if self.headerless { "headerless" } else { "with header" },
            self.columns.len(),
            self.warnings.len()
        )
    }
}

// ============================================================================
// RECORD LOADER
// ============================================================================

pub struct RecordLoader {
    config: LoaderConfig,
    registry: ColumnRegistry,
}

impl RecordLoader {
    pub fn new(config: LoaderConfig) -> Self {
        RecordLoader {
            config,
            registry: ColumnRegistry::new(),
        }
    }

    pub fn with_registry(config: LoaderConfig, registry: ColumnRegistry) -> Self {
        RecordLoader { config, registry }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Read a file and load it
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<LoadReport> {
        let bytes = fs::read(path.as_ref())?;
        self.load(&bytes)
    }

    /// Decode, detect header, validate schema and read every row
    pub fn load(&self, bytes: &[u8]) -> Result<LoadReport> {
        self.load_with(bytes, |_, _| {})
    }

    /// Same as `load`, calling `on_chunk(chunks_read, rows_read)` after each chunk
    pub fn load_with<F>(&self, bytes: &[u8], mut on_chunk: F) -> Result<LoadReport>
    where
        F: FnMut(usize, usize),
    {
        let decoded = self.decode(bytes)?;
        let mut chunks = self.chunks(&decoded.text)?;

        let mut records = Vec::new();
        let mut chunk_count = 0;
        for chunk in chunks.by_ref() {
            records.extend(chunk?);
            chunk_count += 1;
            on_chunk(chunk_count, records.len());
        }

        Ok(LoadReport {
            records,
            encoding: decoded.encoding.to_string(),
            headerless: chunks.headerless(),
            columns: chunks.columns(),
            warnings: chunks.warnings().to_vec(),
            chunks: chunk_count,
        })
    }

    /// Try each configured encoding in order; the first clean decode wins.
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedInput> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        for label in &self.config.encodings {
            let Some(encoding) = Encoding::for_label(label.trim().as_bytes()) else {
                continue;
            };

            if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
                return Ok(DecodedInput {
                    text: text.into_owned(),
                    encoding: encoding.name(),
                });
            }
        }

        Err(ReconError::UnreadableInput {
            tried: self.config.encodings.clone(),
        })
    }

    /// Start chunked reading over decoded text.
    ///
    /// Header detection and schema validation happen here, once, on the
    /// first row; the returned iterator yields `chunk_size` rows at a time.
    pub fn chunks<'a>(&self, text: &'a str) -> Result<RecordChunks<'a>> {
        let mut rows = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.config.delimiter)
            .from_reader(text.as_bytes())
            .into_records();

        let first = match rows.next() {
            Some(row) => row.map_err(malformed)?,
            None => {
                return Err(ReconError::MalformedInput {
                    line: 1,
                    message: "input contains no rows".to_string(),
                })
            }
        };

        let mut warnings = Vec::new();
        let recognized = first
            .iter()
            .filter(|cell| self.registry.resolve(cell).is_some())
            .count();

        // Heuristic: a real header names at least `min_recognized_headers`
        // known columns. A headerless file gets canonical names by position.
        let headerless = recognized < self.config.min_recognized_headers;

        let columns = if headerless {
            self.positional_columns(&first, &mut warnings)
        } else {
            self.header_columns(&first, &mut warnings)
        };

        self.check_required(&columns)?;

        Ok(RecordChunks {
            rows,
            pending: if headerless { Some(first) } else { None },
            columns,
            headerless,
            warnings,
            chunk_size: self.config.chunk_size.max(1),
            done: false,
        })
    }

    fn positional_columns(&self, first: &StringRecord, warnings: &mut Vec<String>) -> Vec<Option<String>> {
        (0..first.len())
            .map(|position| match self.registry.name_at(position) {
                Some(name) => Some(name.to_string()),
                None => {
                    warnings.push(format!(
                        "Column {} has no canonical name in headerless input; dropped",
                        position + 1
                    ));
                    None
                }
            })
            .collect()
    }

    fn header_columns(&self, header: &StringRecord, warnings: &mut Vec<String>) -> Vec<Option<String>> {
        let mut seen: Vec<String> = Vec::new();

        header
            .iter()
            .enumerate()
            .map(|(position, cell)| match self.registry.resolve(cell) {
                Some(def) if seen.contains(&def.name) => {
                    warnings.push(format!(
                        "Duplicate column '{}' (maps to '{}') ignored",
                        cell.trim(),
                        def.name
                    ));
                    None
                }
                Some(def) => {
                    seen.push(def.name.clone());
                    Some(def.name.clone())
                }
                None if cell.trim().is_empty() => {
                    warnings.push(format!("Unnamed column {} dropped", position + 1));
                    None
                }
                None => {
                    warnings.push(format!("Unknown column '{}' dropped", cell.trim()));
                    None
                }
            })
            .collect()
    }

    fn check_required(&self, columns: &[Option<String>]) -> Result<()> {
        let present: Vec<&str> = columns.iter().flatten().map(String::as_str).collect();

        let missing: Vec<String> = self
            .config
            .required_columns
            .iter()
            .filter(|required| {
                let key = self
                    .registry
                    .resolve(required)
                    .map(|def| def.name.clone())
                    .unwrap_or_else(|| column_key(required));
                !present.contains(&key.as_str())
            })
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ReconError::MissingColumns { missing })
        }
    }
}

impl Default for RecordLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

fn malformed(err: csv::Error) -> ReconError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    ReconError::MalformedInput {
        line,
        message: err.to_string(),
    }
}

// ============================================================================
// CHUNKED READING
// ============================================================================

/// Iterator over row chunks. Concatenating every chunk yields the rows in
/// input order.
pub struct RecordChunks<'a> {
    rows: StringRecordsIntoIter<&'a [u8]>,
    /// First row, held back when it turned out to be data
    pending: Option<StringRecord>,
    /// Canonical name per input position; None = dropped
    columns: Vec<Option<String>>,
    headerless: bool,
    warnings: Vec<String>,
    chunk_size: usize,
    done: bool,
}

impl<'a> RecordChunks<'a> {
    pub fn headerless(&self) -> bool {
        self.headerless
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn columns(&self) -> Vec<String> {
        self.columns.iter().flatten().cloned().collect()
    }

    fn to_raw(&self, row: &StringRecord) -> Result<RawRecord> {
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        if row.len() > self.columns.len() {
            return Err(ReconError::MalformedInput {
                line,
                message: format!(
                    "expected {} fields, found {}",
                    self.columns.len(),
                    row.len()
                ),
            });
        }

        let mut raw = RawRecord::new(line);
        for (position, column) in self.columns.iter().enumerate() {
            if let Some(name) = column {
                // Short rows are padded with blanks
                raw.insert(name.clone(), row.get(position).unwrap_or(""));
            }
        }
        Ok(raw)
    }
}

impl<'a> Iterator for RecordChunks<'a> {
    type Item = Result<Vec<RawRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut chunk = Vec::with_capacity(self.chunk_size);

        while chunk.len() < self.chunk_size {
            let row = match self.pending.take() {
                Some(row) => row,
                None => match self.rows.next() {
                    Some(Ok(row)) => row,
                    Some(Err(e)) => {
                        self.done = true;
                        return Some(Err(malformed(e)));
                    }
                    None => {
                        self.done = true;
                        break;
                    }
                },
            };

            match self.to_raw(&row) {
                Ok(raw) => chunk.push(raw),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        if chunk.is_empty() {
            None
        } else {
            Some(Ok(chunk))
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
