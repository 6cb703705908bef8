use codelist_manager::io::excel_read::{self, InputWorkbook};
use codelist_manager::io::excel_write;
use codelist_manager::model::{CodeEntry, RemoteCodeList};
use tempfile::tempdir;

fn entry(sender: &str, receiver: &str, description: &str, first_text: &str) -> CodeEntry {
    let mut entry = CodeEntry {
        active: true,
        sender_code: sender.to_string(),
        receiver_code: receiver.to_string(),
        description: description.to_string(),
        ..CodeEntry::default()
    };
    entry.text[0] = first_text.to_string();
    entry
}

#[test]
fn backup_sheet_roundtrips_through_the_entry_parser() {
    let snapshot = RemoteCodeList {
        id: "Zydus_SAP_Cust|||3".to_string(),
        name: "Zydus_SAP_Cust".to_string(),
        version_number: 3,
        create_date: "2019-05-16T17:08:52.000+0000".to_string(),
        owner: "apiuser".to_string(),
        status: 1,
        entries: vec![
            entry("s1", "r1", "first", "t1"),
            entry("s2", "r2", "second", ""),
            entry("s3", "r3", "third", "t3"),
        ],
    };

    let temp = tempdir().expect("temporary directory");
    let path = temp.path().join("backup.xlsx");
    excel_write::write_backup(&path, std::slice::from_ref(&snapshot)).expect("backup written");

    let mut workbook = InputWorkbook::open(&path).expect("backup readable");
    assert_eq!(workbook.sheet_names(), [snapshot.id.as_str()]);

    // Header plus one row per entry.
    let rows = workbook.sheet_rows(&snapshot.id).expect("sheet read");
    assert_eq!(rows.len(), snapshot.entries.len() + 1);
    assert_eq!(rows[0][..4], ["Action", "SenderCode", "ReceiverCode", "Description"]);

    let (draft, diagnostics) = excel_read::parse_rows(&snapshot.id, &rows);
    assert!(diagnostics.is_empty());
    assert_eq!(draft.entries, snapshot.entries);
    assert!(draft.entries.iter().all(|entry| entry.active));
}

#[test]
fn empty_backup_still_saves_a_readable_workbook() {
    let temp = tempdir().expect("temporary directory");
    let path = temp.path().join("backup.xlsx");
    excel_write::write_backup(&path, &[]).expect("backup written");

    let workbook = InputWorkbook::open(&path).expect("backup readable");
    assert_eq!(workbook.sheet_names(), ["Sheet1"]);
}
