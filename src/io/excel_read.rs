use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::error::{Result, ToolError};
use crate::model::{CodeEntry, CodeListDraft, TEXT_FIELDS};

/// Sheet name reserved for operator instructions; never treated as a code
/// list.
pub const INSTRUCTIONS_SHEET: &str = "Instructions";

/// First header cell of the fixed code list layout. A sheet whose first row
/// starts with this marker carries a header row rather than data.
pub const ACTION_HEADER: &str = "Action";

/// An input (or backup) workbook opened for reading.
pub struct InputWorkbook {
    workbook: Xlsx<BufReader<File>>,
    names: Vec<String>,
}

impl InputWorkbook {
    pub fn open(path: &Path) -> Result<Self> {
        let workbook: Xlsx<_> = open_workbook(path)?;
        let names = workbook.sheet_names().to_owned();
        Ok(Self { workbook, names })
    }

    /// Every sheet name in workbook order.
    pub fn sheet_names(&self) -> &[String] {
        &self.names
    }

    /// Sheet names that hold code lists, in workbook order.
    pub fn list_names(&self) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| name.as_str() != INSTRUCTIONS_SHEET)
            .cloned()
            .collect()
    }

    /// Returns the sheet's cells as rows of strings. Cell coercion follows
    /// the same rules for every cell type, so numeric codes survive as their
    /// display text.
    pub fn sheet_rows(&mut self, name: &str) -> Result<Vec<Vec<String>>> {
        let range = self
            .workbook
            .worksheet_range(name)
            .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?
            .map_err(ToolError::from)?;
        Ok(range
            .rows()
            .map(|row| row.iter().map(|cell| cell_to_string(Some(cell))).collect())
            .collect())
    }
}

/// Parses one sheet's rows into a [`CodeListDraft`] plus row-numbered
/// diagnostics for invalid data.
///
/// Column layout: 0 = active flag (`"Yes"` means active), 1 = sender code,
/// 2 = receiver code, 3 = description, 4..=12 = up to nine free-text fields
/// (missing trailing cells default to empty). A leading header row is
/// recognised by its `Action` marker and skipped. An active row missing its
/// sender or receiver code is dropped with a diagnostic citing its 1-based
/// row number; parsing of the rest of the sheet continues.
pub fn parse_rows(name: &str, rows: &[Vec<String>]) -> (CodeListDraft, Vec<String>) {
    let mut entries = Vec::new();
    let mut diagnostics = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let cell = |col: usize| row.get(col).cloned().unwrap_or_default();
        if index == 0 && cell(0) == ACTION_HEADER {
            continue;
        }

        let active = cell(0) == "Yes";
        let sender_code = cell(1);
        let receiver_code = cell(2);
        if active && (sender_code.is_empty() || receiver_code.is_empty()) {
            diagnostics.push(format!(
                "ERROR: invalid data (sendercode or receivercode missing) ignoring at row {}",
                index + 1
            ));
            continue;
        }

        let mut text: [String; TEXT_FIELDS] = Default::default();
        for (slot, value) in text.iter_mut().enumerate() {
            *value = cell(slot + 4);
        }

        entries.push(CodeEntry {
            active,
            sender_code,
            receiver_code,
            description: cell(3),
            text,
        });
    }

    (
        CodeListDraft {
            name: name.to_string(),
            entries,
        },
        diagnostics,
    )
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
