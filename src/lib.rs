//! Core library for the habits-sync command line application.
//!
//! The library pulls the newest Loop Habit Tracker backup from a cloud drive,
//! counts completed check-ins per habit over a date window, and overwrites a
//! sheet of a spreadsheet with the result. Collaborators sit behind traits:
//! the drive in [`habits::tools::io::drive`], the backup database in
//! [`habits::tools::io::sqlite`], the spreadsheet in
//! [`habits::tools::io::workbook`] and the local cache in
//! [`habits::tools::cache`]. Window resolution lives in
//! [`habits::tools::dates`] and the run itself in [`habits::tools::sync`].

pub mod habits;

pub use habits::tools::{Result, SyncError, cache, dates, error, io, logging, model, sync};
