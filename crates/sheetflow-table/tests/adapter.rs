//! Table adapter behaviour against the in-memory spreadsheet.

use pretty_assertions::assert_eq;
use sheetflow_table::prelude::*;
use sheetflow_table::{Dimension, Request};
use sheetflow_test_utils::{grid, strings, Call, CallKind, MemorySheets};

fn table(sheets: &MemorySheets) -> SheetTable<MemorySheets> {
    SheetTable::new(sheets.clone())
}

#[tokio::test]
async fn first_append_synthesizes_header() {
    let sheets = MemorySheets::standard();
    let t = table(&sheets);

    t.append_record("Sheet2", &Record::new().with("Name", "A").with("Team", "X"))
        .await
        .unwrap();

    assert_eq!(
        t.read_table("Sheet2").await.unwrap(),
        grid(&[&["Name", "Team"], &["A", "X"]])
    );
}

#[tokio::test]
async fn header_follows_insertion_order() {
    let sheets = MemorySheets::standard();
    let t = table(&sheets);

    let record = Record::new()
        .with("Zeta", "1")
        .with("Alpha", "2")
        .with("Mid", "3");
    t.append_record("Sheet1", &record).await.unwrap();

    assert_eq!(
        t.headers("Sheet1").await.unwrap(),
        strings(&["Zeta", "Alpha", "Mid"])
    );
}

#[tokio::test]
async fn unknown_key_adds_column_before_write() {
    let sheets = MemorySheets::standard().with_table("Sheet2", grid(&[&["Name", "Team"], &["A", "X"]]));
    let t = table(&sheets);

    let record = Record::new()
        .with("Name", "B")
        .with("Team", "Y")
        .with("Role", "Admin");
    t.append_record("Sheet2", &record).await.unwrap();

    let values = t.read_table("Sheet2").await.unwrap();
    let headers = &values[0];
    assert_eq!(headers, &strings(&["Name", "Team", "Role"]));
    assert_eq!(values.len(), 3);

    let first = Record::from_row(headers, &values[1]);
    let second = Record::from_row(headers, &values[2]);
    assert_eq!(first.get("Role"), Some(""));
    assert_eq!(second.get("Role"), Some("Admin"));
}

#[tokio::test]
async fn one_column_per_missing_key_then_one_append() {
    let sheets = MemorySheets::standard().with_table("Sheet1", grid(&[&["Name"]]));
    let t = table(&sheets);

    let record = Record::new()
        .with("Name", "A")
        .with("Email", "a@example.com")
        .with("Phone", "555");
    t.append_record("Sheet1", &record).await.unwrap();

    let writes = sheets.mutations();
    assert_eq!(
        writes,
        vec![
            Call::UpdateValues {
                range: "Sheet1!B1".into(),
                rows: grid(&[&["Email"]]),
            },
            Call::UpdateValues {
                range: "Sheet1!C1".into(),
                rows: grid(&[&["Phone"]]),
            },
            Call::AppendValues {
                range: "Sheet1!A1".into(),
                rows: grid(&[&["A", "a@example.com", "555"]]),
            },
        ]
    );
}

#[tokio::test]
async fn absent_fields_are_blank() {
    let sheets = MemorySheets::standard()
        .with_table("Sheet2", grid(&[&["Name", "Team", "Role"]]));
    let t = table(&sheets);

    t.append_record("Sheet2", &Record::new().with("Role", "Lead"))
        .await
        .unwrap();

    assert_eq!(sheets.grid("Sheet2")[1], strings(&["", "", "Lead"]));
}

#[tokio::test]
async fn strict_policy_leaves_schema_alone() {
    let sheets = MemorySheets::standard().with_table("Sheet2", grid(&[&["Name", "Team"]]));
    let t = table(&sheets).with_policy(SchemaPolicy::Strict);

    let err = t
        .append_record("Sheet2", &Record::new().with("Role", "Admin"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(sheets.mutations().is_empty());
}

#[tokio::test]
async fn ensure_columns_reports_additions() {
    let sheets = MemorySheets::standard().with_table("Sheet4", grid(&[&["Project ID", "Title"]]));
    let t = table(&sheets);

    let added = t
        .ensure_columns("Sheet4", ["Project ID", "Status", "Tags", "Status"])
        .await
        .unwrap();

    assert_eq!(added, strings(&["Status", "Tags"]));
    assert_eq!(
        t.headers("Sheet4").await.unwrap(),
        strings(&["Project ID", "Title", "Status", "Tags"])
    );
}

#[tokio::test]
async fn write_header_merges_existing_headers() {
    let sheets = MemorySheets::standard().with_table("Sheet5", grid(&[&["Notes"]]));
    let t = table(&sheets);

    t.write_header("Sheet5", &Record::header(["Team", "QuestionText"]))
        .await
        .unwrap();

    assert_eq!(
        sheets.grid("Sheet5"),
        grid(&[&["Notes", "Team", "QuestionText"]])
    );
}

#[tokio::test]
async fn rename_and_delete_missing_column_issue_no_writes() {
    let sheets = MemorySheets::standard().with_table("Sheet2", grid(&[&["Name", "Team"], &["A", "X"]]));
    let t = table(&sheets);

    let rename = t.rename_column("Sheet2", "Role", "Position").await.unwrap_err();
    let delete = t.delete_column("Sheet2", "Role").await.unwrap_err();

    assert!(rename.is_not_found());
    assert!(delete.is_not_found());
    assert!(sheets.mutations().is_empty());
    assert!(sheets
        .calls()
        .iter()
        .all(|c| c.kind() == CallKind::GetValues));
}

#[tokio::test]
async fn rename_column_rewrites_header_cell() {
    let sheets = MemorySheets::standard().with_table("Sheet2", grid(&[&["Name", "Team"], &["A", "X"]]));
    let t = table(&sheets);

    t.rename_column("Sheet2", "Team", "Squad").await.unwrap();

    assert_eq!(
        sheets.grid("Sheet2"),
        grid(&[&["Name", "Squad"], &["A", "X"]])
    );
}

#[tokio::test]
async fn delete_column_removes_values() {
    let sheets = MemorySheets::standard().with_table(
        "Sheet2",
        grid(&[&["Name", "Team", "Role"], &["A", "X", "Admin"], &["B", "Y"]]),
    );
    let t = table(&sheets);

    t.delete_column("Sheet2", "Team").await.unwrap();

    assert_eq!(
        sheets.grid("Sheet2"),
        grid(&[&["Name", "Role"], &["A", "Admin"], &["B"]])
    );
}

#[tokio::test]
async fn delete_row_shifts_later_rows_up() {
    let sheets = MemorySheets::standard().with_table(
        "Sheet1",
        grid(&[&["Name"], &["r1"], &["r2"], &["r3"], &["r4"]]),
    );
    let t = table(&sheets);

    t.delete_row("Sheet1", 2).await.unwrap();

    let values = t.read_table("Sheet1").await.unwrap();
    assert_eq!(values.len(), 4);
    assert_eq!(values, grid(&[&["Name"], &["r1"], &["r3"], &["r4"]]));
}

#[tokio::test]
async fn delete_row_targets_sheet_by_id() {
    let sheets = MemorySheets::standard();
    let t = table(&sheets);

    t.delete_row("Sheet4", 3).await.unwrap();

    let batch = sheets
        .calls()
        .into_iter()
        .find(|c| c.kind() == CallKind::BatchUpdate)
        .unwrap();
    assert_eq!(
        batch,
        Call::BatchUpdate(vec![Request::delete_dimension(3, Dimension::Rows, 3, 4)])
    );
}

#[tokio::test]
async fn update_cell_range_writes_span() {
    let sheets = MemorySheets::standard().with_table(
        "Sheet3",
        grid(&[&["A", "B", "C", "D"], &["1", "2", "3", "4"]]),
    );
    let t = table(&sheets);

    t.update_cell_range("Sheet3", 1, 1, 3, &strings(&["x", "y"]))
        .await
        .unwrap();

    assert_eq!(sheets.grid("Sheet3")[1], strings(&["1", "x", "y", "4"]));
}

#[tokio::test]
async fn update_cells_overlays_named_values() {
    let sheets = MemorySheets::standard().with_table(
        "Sheet3",
        grid(&[
            &["Project ID", "Assignee", "Kanban Initialized"],
            &["P-1", "Ada", "No"],
        ]),
    );
    let t = table(&sheets);

    let patch = Record::new()
        .with("Kanban Initialized", "Yes")
        .with("Ignored", "zzz");
    t.update_cells("Sheet3", 1, &patch).await.unwrap();

    assert_eq!(sheets.grid("Sheet3")[1], strings(&["P-1", "Ada", "Yes"]));
}

#[tokio::test]
async fn update_cells_on_missing_row() {
    let sheets = MemorySheets::standard().with_table("Sheet3", grid(&[&["Project ID"]]));
    let t = table(&sheets);

    let err = t
        .update_cells("Sheet3", 4, &Record::new().with("Project ID", "P"))
        .await
        .unwrap_err();

    assert!(matches!(err, TableError::NotFound(NotFoundError::Row { .. })));
}

#[tokio::test]
async fn update_cells_refuses_header_row() {
    let header = grid(&[&["Project ID", "Kanban Initialized"], &["P-1", "No"]]);
    let sheets = MemorySheets::standard().with_table("Sheet3", header.clone());
    let t = table(&sheets);

    let err = t
        .update_cells("Sheet3", 0, &Record::new().with("Kanban Initialized", "Yes"))
        .await
        .unwrap_err();

    assert!(matches!(err, TableError::NotFound(NotFoundError::Row { .. })));
    assert!(sheets.mutations().is_empty());
    assert_eq!(sheets.grid("Sheet3"), header);
}

#[tokio::test]
async fn find_row_scans_identifier_column() {
    let sheets = MemorySheets::standard().with_table(
        "Sheet4",
        grid(&[
            &["Project ID", "Task ID"],
            &["P", "TASK-1"],
            &["P", "TASK-2"],
        ]),
    );
    let t = table(&sheets);

    assert_eq!(t.find_row("Sheet4", "Task ID", "TASK-2").await.unwrap(), 2);
    assert!(t
        .find_row("Sheet4", "Task ID", "TASK-9")
        .await
        .unwrap_err()
        .is_not_found());
    assert!(t
        .find_row("Sheet4", "Owner", "x")
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn reading_unknown_tab_is_api_error() {
    let sheets = MemorySheets::standard();
    let err = table(&sheets).read_table("Nope").await.unwrap_err();
    assert!(matches!(err, TableError::Api { status: 400, .. }));
}

#[tokio::test]
async fn ensure_table_creates_once() {
    let sheets = MemorySheets::new().with_sheet("Sheet1");
    let t = table(&sheets);

    assert!(t.ensure_table("Archive").await.unwrap());
    assert!(!t.ensure_table("Archive").await.unwrap());
    assert_eq!(sheets.titles(), strings(&["Sheet1", "Archive"]));
}

#[tokio::test]
async fn first_append_creates_missing_tab() {
    let sheets = MemorySheets::new().with_sheet("Sheet1");
    let t = table(&sheets);

    t.append_record("Archive", &Record::new().with("Name", "A").with("Team", "X"))
        .await
        .unwrap();

    assert_eq!(sheets.titles(), strings(&["Sheet1", "Archive"]));
    assert_eq!(
        sheets.grid("Archive"),
        grid(&[&["Name", "Team"], &["A", "X"]])
    );
}

#[tokio::test]
async fn header_write_creates_missing_tab() {
    let sheets = MemorySheets::new().with_sheet("Sheet1");
    let t = table(&sheets);

    t.write_header("Sheet5", &Record::header(["Team", "QuestionText"]))
        .await
        .unwrap();

    assert_eq!(sheets.grid("Sheet5"), grid(&[&["Team", "QuestionText"]]));
    // plain reads of a missing tab still fail
    assert!(matches!(
        t.read_table("Nope").await.unwrap_err(),
        TableError::Api { status: 400, .. }
    ));
}

#[tokio::test]
async fn quoted_tab_names_round_trip() {
    let sheets = MemorySheets::new().with_sheet("Form Questions");
    let t = table(&sheets);

    t.append_record("Form Questions", &Record::new().with("Team", "CM"))
        .await
        .unwrap();

    assert_eq!(sheets.calls()[0], Call::GetValues("'Form Questions'".into()));
    assert_eq!(sheets.grid("Form Questions"), grid(&[&["Team"], &["CM"]]));
}

#[tokio::test]
async fn transport_failure_propagates() {
    let sheets = MemorySheets::standard();
    sheets.fail_on(CallKind::AppendValues);
    let t = table(&sheets);

    let err = t
        .append_record("Sheet1", &Record::new().with("Name", "A"))
        .await
        .unwrap_err();

    assert!(matches!(err, TableError::Api { status: 500, .. }));
    assert_eq!(sheets.grid("Sheet1"), grid(&[&["Name"]]));
}
