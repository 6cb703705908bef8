use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use rust_xlsxwriter::Workbook;
use tracing::info;

use crate::error::Result;
use crate::model::RemoteCodeList;

/// Fixed column layout shared by backup sheets and input templates.
pub const BACKUP_HEADER: [&str; 13] = [
    "Action",
    "SenderCode",
    "ReceiverCode",
    "Description",
    "Text1",
    "Text2",
    "Text3",
    "Text4",
    "Text5",
    "Text6",
    "Text7",
    "Text8",
    "Text9",
];

/// Builds the timestamped path for this run's backup file, creating the
/// backup directory if it does not exist yet. Each run gets its own file;
/// nothing is ever overwritten.
pub fn backup_path(dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        info!(dir = %dir.display(), "creating backup directory");
        fs::create_dir_all(dir)?;
    }
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    Ok(dir.join(format!("bkp_codelist_{stamp}.xlsx")))
}

/// Writes one sheet per remote snapshot into a single workbook at `path`.
///
/// Sheets are named by the remote list identifier and every data row is
/// stamped `Action = "Yes"`, so re-importing the file recreates all entries
/// as active. This is a lossy-but-recoverable snapshot, not a byte-exact
/// restore.
pub fn write_backup(path: &Path, snapshots: &[RemoteCodeList]) -> Result<()> {
    let mut workbook = Workbook::new();
    if snapshots.is_empty() {
        // A workbook needs at least one sheet; the default "Sheet1" is
        // ignored when the backup is read back.
        workbook.add_worksheet();
    }

    for snapshot in snapshots {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&snapshot.id)?;

        for (col_idx, header) in BACKUP_HEADER.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, *header)?;
        }

        for (row_idx, entry) in snapshot.entries.iter().enumerate() {
            let row = (row_idx + 1) as u32;
            worksheet.write_string(row, 0, "Yes")?;
            worksheet.write_string(row, 1, &entry.sender_code)?;
            worksheet.write_string(row, 2, &entry.receiver_code)?;
            worksheet.write_string(row, 3, &entry.description)?;
            for (slot, value) in entry.text.iter().enumerate() {
                worksheet.write_string(row, (slot + 4) as u16, value)?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
