use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::client::DirectoryClient;
use crate::error::{DirectoryError, Result, ToolError};
use crate::io::excel_read::{self, InputWorkbook};
use crate::io::excel_write;
use crate::model::{CodeEntry, Outcome, RemoteCodeList};
use crate::report::RunReport;

/// Default sheet created by spreadsheet libraries for otherwise empty
/// workbooks; never holds a snapshot.
const DEFAULT_SHEET: &str = "Sheet1";

/// How the engine treats remote lists that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Update entries in place, creating lists that do not exist yet. No
    /// remote list is ever deleted.
    #[default]
    Update,
    /// Delete every snapshotted list first, then recreate from the
    /// workbook. Destructive; the pre-change backup is the only way back.
    Replace,
}

/// The reconciliation engine: drives the snapshot, clear, and
/// recreate/update phases over one input workbook.
pub struct Reconciler<'a, C> {
    client: &'a C,
    backup_dir: PathBuf,
    mode: Mode,
}

impl<'a, C: DirectoryClient> Reconciler<'a, C> {
    pub fn new(client: &'a C, backup_dir: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            client,
            backup_dir: backup_dir.into(),
            mode,
        }
    }

    /// Runs the full reconciliation over the workbook at `input`.
    ///
    /// Phase ordering is the safety property of the design: the backup file
    /// is durably saved before the first delete call, and a list whose
    /// delete fails is excluded from every later mutation in the same run.
    #[instrument(level = "info", skip_all, fields(input = %input.display(), mode = ?self.mode))]
    pub fn run(&self, input: &Path) -> Result<RunReport> {
        self.client
            .ping()
            .map_err(ToolError::ServiceUnreachable)?;

        let mut workbook = InputWorkbook::open(input)?;
        let list_names = workbook.list_names();
        if list_names.is_empty() {
            return Err(ToolError::NoCodeLists);
        }
        info!(lists = list_names.len(), "reconciling code lists");

        let mut report = RunReport::new();
        let (snapshots, ids_by_name) = self.snapshot_phase(&list_names, &mut report);

        let backup_path = excel_write::backup_path(&self.backup_dir)
            .and_then(|path| self.save_backup(&path, &snapshots).map(|()| path))?;
        info!(path = %backup_path.display(), lists = snapshots.len(), "backup file created");

        let delete_failed = match self.mode {
            Mode::Replace => self.delete_phase(&backup_path, &mut report)?,
            Mode::Update => BTreeSet::new(),
        };

        self.apply_phase(
            &mut workbook,
            &list_names,
            &ids_by_name,
            &delete_failed,
            &mut report,
        )?;
        Ok(report)
    }

    /// Phase 1: fetch the current remote state of every input list. A list
    /// that does not exist remotely simply has nothing to snapshot; any
    /// other fetch failure is recorded and the phase continues.
    fn snapshot_phase(
        &self,
        names: &[String],
        report: &mut RunReport,
    ) -> (Vec<RemoteCodeList>, BTreeMap<String, String>) {
        let mut snapshots = Vec::new();
        let mut ids_by_name = BTreeMap::new();

        for name in names {
            match self.client.fetch_snapshot(name) {
                Ok(snapshot) => {
                    debug!(
                        list = %name,
                        id = %snapshot.id,
                        entries = snapshot.entries.len(),
                        "snapshotted remote list"
                    );
                    ids_by_name.insert(name.clone(), snapshot.id.clone());
                    snapshots.push(snapshot);
                }
                Err(DirectoryError::NotFound) => {
                    debug!(list = %name, "no remote list to snapshot");
                }
                Err(err) => {
                    warn!(list = %name, %err, "snapshot failed");
                    report.push_diagnostic(format!(
                        "ERROR: failed to snapshot code list \"{name}\": {err}"
                    ));
                }
            }
        }

        (snapshots, ids_by_name)
    }

    fn save_backup(&self, path: &Path, snapshots: &[RemoteCodeList]) -> Result<()> {
        excel_write::write_backup(path, snapshots).map_err(|err| ToolError::BackupFailed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    /// Phase 2: delete every list that made it into the backup. The set of
    /// identifiers is read back from the saved file, so only lists whose
    /// snapshot is durably on disk are ever deleted.
    fn delete_phase(&self, backup_path: &Path, report: &mut RunReport) -> Result<BTreeSet<String>> {
        let backup = InputWorkbook::open(backup_path)?;
        let mut failed = BTreeSet::new();

        for id in backup.sheet_names() {
            if id == DEFAULT_SHEET {
                continue;
            }
            match self.client.delete_by_id(id) {
                Ok(()) => info!(id = %id, "deleted remote code list"),
                Err(err) => {
                    warn!(id = %id, %err, "delete failed, list left untouched");
                    report.push_diagnostic(format!(
                        "ERROR: unable to delete code list \"{id}\": {err}"
                    ));
                    report.push_diagnostic(format!(
                        "It is recommended to remove all versions of code list \"{id}\" manually and run again."
                    ));
                    failed.insert(id.clone());
                }
            }
        }

        Ok(failed)
    }

    /// Phase 3: push every input sheet to the service, updating in place
    /// where the list still exists and creating it otherwise. Lists whose
    /// delete failed in phase 2 are skipped entirely.
    fn apply_phase(
        &self,
        workbook: &mut InputWorkbook,
        names: &[String],
        ids_by_name: &BTreeMap<String, String>,
        delete_failed: &BTreeSet<String>,
        report: &mut RunReport,
    ) -> Result<()> {
        for name in names {
            if let Some(id) = ids_by_name.get(name) {
                if delete_failed.contains(id) {
                    warn!(list = %name, id = %id, "skipping list whose delete failed");
                    report.record_outcome(name.clone(), Outcome::DeleteFailed);
                    continue;
                }
            }

            let rows = workbook.sheet_rows(name)?;
            let (draft, diagnostics) = excel_read::parse_rows(name, &rows);
            if !diagnostics.is_empty() {
                report.push_diagnostic(format!("Errors found for code list \"{name}\""));
                report.extend_diagnostics(diagnostics);
            }

            let entries = draft.active_entries();
            let (outcome, diagnostic) = self.push_list(name, &entries);
            match outcome {
                Outcome::Updated => info!(list = %name, entries = entries.len(), "updated"),
                Outcome::Created => info!(list = %name, entries = entries.len(), "created"),
                _ => warn!(list = %name, "push failed"),
            }
            if let Some(message) = diagnostic {
                report.push_diagnostic(message);
            }
            report.record_outcome(name.clone(), outcome);
        }

        Ok(())
    }

    /// Attempts a bulk in-place update first; a NotFound answer from either
    /// the lookup or the update itself falls back to creating the list with
    /// the same entry set. The entry set is sent whole or not at all.
    fn push_list(&self, name: &str, entries: &[CodeEntry]) -> (Outcome, Option<String>) {
        match self.client.lookup_id(name) {
            Ok(id) => match self.client.bulk_replace_entries(&id, entries) {
                Ok(()) => return (Outcome::Updated, None),
                Err(DirectoryError::NotFound) => {
                    debug!(list = %name, "remote list vanished, falling back to create");
                }
                Err(err) => {
                    return (
                        Outcome::CreateFailed,
                        Some(format!(
                            "ERROR: failed to update code list \"{name}\": {err}"
                        )),
                    );
                }
            },
            Err(DirectoryError::NotFound) => {
                debug!(list = %name, "no remote list, creating");
            }
            Err(err) => {
                return (
                    Outcome::CreateFailed,
                    Some(format!(
                        "ERROR: failed to look up code list \"{name}\": {err}"
                    )),
                );
            }
        }

        match self.client.create_list(name, entries) {
            Ok(()) => (Outcome::Created, None),
            Err(err) => (
                Outcome::CreateFailed,
                Some(format!(
                    "ERROR: failed to create code list \"{name}\": {err}"
                )),
            ),
        }
    }
}
