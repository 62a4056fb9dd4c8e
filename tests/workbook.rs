mod common;

use common::create_spreadsheet;
use habits_sync::SyncError;
use habits_sync::io::drive::MountedDrive;
use habits_sync::io::excel_read::read_workbook;
use habits_sync::io::excel_write::write_workbook;
use habits_sync::io::workbook::{SheetPublisher, WorkbookPublisher};
use habits_sync::model::{Cell, HabitStat, SheetTable, WorkbookData};
use tempfile::tempdir;

const SPREADSHEET: &str = "Habits 2021.xlsx";

fn header() -> Vec<Cell> {
    vec![Cell::from("ID"), Cell::from("Name"), Cell::from("Count")]
}

#[test]
fn create_sheet_appends_once_and_keeps_other_sheets() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join(SPREADSHEET);
    create_spreadsheet(&path);
    let publisher = WorkbookPublisher::new(MountedDrive::new(temp_dir.path()));

    publisher.create_sheet(SPREADSHEET, "Q1").expect("sheet created");
    publisher
        .create_sheet(SPREADSHEET, "Q1")
        .expect("existing sheet is accepted");

    let workbook = read_workbook(&path).expect("workbook read");
    let names: Vec<&str> = workbook
        .tables
        .iter()
        .map(|table| table.sheet_name.as_str())
        .collect();
    assert_eq!(names, vec!["Summary", "Q1"]);

    let summary = workbook.sheet("Summary").expect("summary sheet");
    assert_eq!(
        summary.rows,
        vec![
            vec![Cell::from("Habit tracking")],
            vec![Cell::Empty, Cell::Number(42.0)],
        ]
    );
}

#[test]
fn update_sheet_writes_header_and_rows() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join(SPREADSHEET);
    create_spreadsheet(&path);
    let publisher = WorkbookPublisher::new(MountedDrive::new(temp_dir.path()));
    publisher.create_sheet(SPREADSHEET, "Q1").expect("sheet created");

    publisher
        .update_sheet(
            SPREADSHEET,
            "Q1",
            &[HabitStat::new(2, "Read", 1), HabitStat::new(1, "Run", 12)],
        )
        .expect("sheet updated");

    let workbook = read_workbook(&path).expect("workbook read");
    let sheet = workbook.sheet("Q1").expect("stats sheet");
    assert_eq!(
        sheet.rows,
        vec![
            header(),
            vec![Cell::Number(2.0), Cell::from("Read"), Cell::Number(1.0)],
            vec![Cell::Number(1.0), Cell::from("Run"), Cell::Number(12.0)],
        ]
    );
    assert!(!temp_dir.path().join("Habits 2021.xlsx.partial").exists());
}

#[test]
fn update_sheet_replaces_previous_rows() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join(SPREADSHEET);
    create_spreadsheet(&path);
    let publisher = WorkbookPublisher::new(MountedDrive::new(temp_dir.path()));
    publisher.create_sheet(SPREADSHEET, "Q1").expect("sheet created");

    publisher
        .update_sheet(
            SPREADSHEET,
            "Q1",
            &[
                HabitStat::new(1, "Run", 3),
                HabitStat::new(2, "Read", 4),
                HabitStat::new(3, "Walk", 5),
            ],
        )
        .expect("first update");
    publisher
        .update_sheet(SPREADSHEET, "Q1", &[HabitStat::new(9, "Swim", 1)])
        .expect("second update");

    let workbook = read_workbook(&path).expect("workbook read");
    let sheet = workbook.sheet("Q1").expect("stats sheet");
    assert_eq!(
        sheet.rows,
        vec![
            header(),
            vec![Cell::Number(9.0), Cell::from("Swim"), Cell::Number(1.0)],
        ]
    );
}

#[test]
fn update_of_missing_sheet_is_a_publish_error() {
    let temp_dir = tempdir().expect("temporary directory");
    create_spreadsheet(&temp_dir.path().join(SPREADSHEET));
    let publisher = WorkbookPublisher::new(MountedDrive::new(temp_dir.path()));

    let err = publisher
        .update_sheet(SPREADSHEET, "Q1", &[HabitStat::new(1, "Run", 1)])
        .expect_err("must fail");

    assert!(matches!(err, SyncError::Publish { .. }), "got {err:?}");
}

#[test]
fn missing_spreadsheet_is_not_found() {
    let temp_dir = tempdir().expect("temporary directory");
    let publisher = WorkbookPublisher::new(MountedDrive::new(temp_dir.path()));

    let err = publisher
        .create_sheet(SPREADSHEET, "Q1")
        .expect_err("must fail");

    assert!(matches!(err, SyncError::NotFound(_)), "got {err:?}");
}

#[test]
fn failed_write_leaves_no_partial_file() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join(SPREADSHEET);
    std::fs::create_dir(&path).expect("directory in the way");
    let workbook = WorkbookData {
        tables: vec![SheetTable {
            sheet_name: "Q1".to_string(),
            rows: vec![header()],
        }],
    };

    let err = write_workbook(&path, &workbook).expect_err("must fail");

    assert!(matches!(err, SyncError::IoAt { .. }), "got {err:?}");
    assert!(!temp_dir.path().join("Habits 2021.xlsx.partial").exists());
}

#[test]
fn integer_cells_are_exact_within_double_precision() {
    let largest_exact = 1_i64 << 53;

    assert_eq!(Cell::from(largest_exact), Cell::Number(9_007_199_254_740_992.0));
    assert_eq!(Cell::from(-7_i64), Cell::Number(-7.0));
}
