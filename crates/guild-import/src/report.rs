//! Workbook-reader collaborator boundary.
//!
//! Report parsing works against [`Workbook`] and [`Sheet`]: header-indexed
//! cell access with typed optional values, raising on a missing required
//! header. [`CsvWorkbook`] backs the boundary with CSV data (one CSV per
//! sheet), which is how exported report sheets arrive here.

use std::collections::HashMap;

use crate::error::ImportError;

/// UTF-8 BOM bytes.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Strip a UTF-8 BOM from the beginning of data if present.
fn strip_utf8_bom(data: &[u8]) -> &[u8] {
    if data.starts_with(UTF8_BOM) {
        &data[UTF8_BOM.len()..]
    } else {
        data
    }
}

/// A named collection of sheets.
pub trait Workbook {
    /// Get a sheet by name.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::MissingSheet` when the workbook has no sheet
    /// with that name.
    fn sheet(&self, name: &str) -> Result<&Sheet, ImportError>;
}

/// A single tabular sheet: a header row plus data rows.
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Parse a sheet from CSV bytes.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::InvalidReport` on malformed CSV or when the
    /// data is empty.
    pub fn from_csv(name: &str, data: &[u8]) -> Result<Self, ImportError> {
        let data = strip_utf8_bom(data);
        if data.is_empty() {
            return Err(ImportError::InvalidReport(format!(
                "Sheet '{name}' is empty"
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| {
                ImportError::InvalidReport(format!("Failed to read headers of '{name}': {e}"))
            })?
            .iter()
            .map(std::string::ToString::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| {
                ImportError::InvalidReport(format!("Failed to parse row in '{name}': {e}"))
            })?;
            rows.push(record.iter().map(std::string::ToString::to_string).collect());
        }

        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
        })
    }

    /// The sheet name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of data rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of the column whose header matches `header` exactly.
    #[must_use]
    pub fn column_exact(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Index of the first column whose header contains `fragment`,
    /// case-insensitive. Column order in the report does not matter.
    #[must_use]
    pub fn column_containing(&self, fragment: &str) -> Option<usize> {
        let fragment = fragment.to_lowercase();
        self.headers
            .iter()
            .position(|h| h.to_lowercase().contains(&fragment))
    }

    /// Like [`Sheet::column_exact`] but raising on a missing header.
    pub fn require_column_exact(&self, header: &str) -> Result<usize, ImportError> {
        self.column_exact(header).ok_or_else(|| ImportError::MissingHeader {
            sheet: self.name.clone(),
            header: header.to_string(),
        })
    }

    /// Like [`Sheet::column_containing`] but raising on a missing header.
    pub fn require_column_containing(&self, fragment: &str) -> Result<usize, ImportError> {
        self.column_containing(fragment)
            .ok_or_else(|| ImportError::MissingHeader {
                sheet: self.name.clone(),
                header: fragment.to_string(),
            })
    }

    /// Trimmed cell value; `None` for out-of-range or blank cells.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)?
            .get(col)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Boolean cell value: "true", "yes" or "1" (case-insensitive).
    #[must_use]
    pub fn cell_bool(&self, row: usize, col: usize) -> bool {
        self.cell(row, col)
            .is_some_and(|v| matches!(v.to_lowercase().as_str(), "true" | "yes" | "1"))
    }
}

/// Workbook backed by CSV data, one CSV per sheet.
#[derive(Debug, Default)]
pub struct CsvWorkbook {
    sheets: HashMap<String, Sheet>,
}

impl CsvWorkbook {
    /// Create an empty workbook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse CSV bytes and add them as a named sheet.
    pub fn add_sheet(&mut self, name: &str, data: &[u8]) -> Result<(), ImportError> {
        let sheet = Sheet::from_csv(name, data)?;
        self.sheets.insert(name.to_string(), sheet);
        Ok(())
    }
}

impl Workbook for CsvWorkbook {
    fn sheet(&self, name: &str) -> Result<&Sheet, ImportError> {
        self.sheets
            .get(name)
            .ok_or_else(|| ImportError::MissingSheet(name.to_string()))
    }
}
