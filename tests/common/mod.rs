//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{Connection, params};

/// Habit row: id, name, archived.
pub type HabitRow<'a> = (i64, &'a str, bool);
/// Repetition row: habit id, timestamp in epoch milliseconds, value.
pub type RepetitionRow = (i64, i64, i64);

pub const COMPLETED: i64 = 2;
pub const SKIPPED: i64 = 3;

/// Epoch milliseconds of `hh:mm:ss` on the given UTC day.
pub fn millis(year: i32, month: u32, day: u32, hms: (u32, u32, u32)) -> i64 {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid date")
        .and_time(NaiveTime::from_hms_opt(hms.0, hms.1, hms.2).expect("valid time"))
        .and_utc()
        .timestamp_millis()
}

/// Writes a database shaped like a Loop Habit Tracker backup.
pub fn create_backup(path: &Path, habits: &[HabitRow<'_>], repetitions: &[RepetitionRow]) {
    let conn = Connection::open(path).expect("backup database created");
    conn.execute_batch(
        "CREATE TABLE Habits (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            archived INTEGER NOT NULL DEFAULT 0,
            color INTEGER,
            description TEXT,
            freq_den INTEGER,
            freq_num INTEGER,
            highlight INTEGER,
            name TEXT NOT NULL,
            position INTEGER,
            reminder_hour INTEGER,
            reminder_min INTEGER
        );
        CREATE TABLE Repetitions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            habit INTEGER NOT NULL REFERENCES Habits(id),
            timestamp INTEGER NOT NULL,
            value INTEGER NOT NULL
        );",
    )
    .expect("schema created");

    for (position, (id, name, archived)) in habits.iter().enumerate() {
        conn.execute(
            "INSERT INTO Habits (id, archived, name, position) VALUES (?1, ?2, ?3, ?4)",
            params![id, archived, name, position as i64],
        )
        .expect("habit inserted");
    }
    for (habit, timestamp, value) in repetitions {
        conn.execute(
            "INSERT INTO Repetitions (habit, timestamp, value) VALUES (?1, ?2, ?3)",
            params![habit, timestamp, value],
        )
        .expect("repetition inserted");
    }
}

/// Writes a spreadsheet with a single `Summary` sheet holding a title cell.
pub fn create_spreadsheet(path: &Path) {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Summary").expect("sheet named");
    worksheet
        .write_string(0, 0, "Habit tracking")
        .expect("title written");
    worksheet.write_number(1, 1, 42.0).expect("number written");
    workbook.save(path).expect("spreadsheet saved");
}
