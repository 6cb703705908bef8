use std::fmt;

/// Number of free-text fields carried by every code list entry.
pub const TEXT_FIELDS: usize = 9;

/// One row of a code list: a sender/receiver code pair with auxiliary text.
///
/// Only entries with `active == true` are ever forwarded to the directory
/// service; inactive entries are parsed and retained so drafts mirror the
/// spreadsheet, but they never leave the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeEntry {
    pub active: bool,
    pub sender_code: String,
    pub receiver_code: String,
    pub description: String,
    pub text: [String; TEXT_FIELDS],
}

/// The target state for one code list, parsed from one spreadsheet sheet.
/// Entry order follows row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeListDraft {
    pub name: String,
    pub entries: Vec<CodeEntry>,
}

impl CodeListDraft {
    /// Returns the entries eligible for upload, in original row order.
    pub fn active_entries(&self) -> Vec<CodeEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.active)
            .cloned()
            .collect()
    }
}

/// A code list as currently stored by the directory service. `id` is the
/// stable key used for deletion; `name` is the key used for lookup and
/// recreation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCodeList {
    pub id: String,
    pub name: String,
    pub version_number: i64,
    pub create_date: String,
    pub owner: String,
    pub status: i64,
    pub entries: Vec<CodeEntry>,
}

/// Terminal result of a run for a single code list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The remote list existed and its entries were replaced in bulk.
    Updated,
    /// The list did not exist remotely (or had just been cleared) and was
    /// created from the draft.
    Created,
    /// The remote copy could not be deleted; the list was left untouched for
    /// the rest of the run.
    DeleteFailed,
    /// The update or create call failed.
    CreateFailed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Updated => write!(f, "updated"),
            Outcome::Created => write!(f, "created"),
            Outcome::DeleteFailed => write!(f, "delete failed"),
            Outcome::CreateFailed => write!(f, "create failed"),
        }
    }
}
