//! Resolution of the reporting window.
//!
//! A window is either an explicit `from`/`to` pair of calendar days or one of
//! the four fixed quarters of the current year. "Current" is always read from
//! an injected [`Clock`] so resolution stays deterministic under test.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use tracing::debug;

use crate::habits::tools::error::{Result, SyncError};
use crate::habits::tools::model::TimeWindow;

/// Layout accepted for explicit dates.
pub const DATE_LAYOUT: &str = "%Y-%m-%d";

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// One of the four calendar quarters of a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiscalQuarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl FiscalQuarter {
    pub const ALL: [FiscalQuarter; 4] = [
        FiscalQuarter::Q1,
        FiscalQuarter::Q2,
        FiscalQuarter::Q3,
        FiscalQuarter::Q4,
    ];

    /// Maps a 1-based quarter index to a quarter.
    pub fn from_index(index: i32) -> Result<Self> {
        match index {
            1 => Ok(FiscalQuarter::Q1),
            2 => Ok(FiscalQuarter::Q2),
            3 => Ok(FiscalQuarter::Q3),
            4 => Ok(FiscalQuarter::Q4),
            other => Err(SyncError::Validation(format!(
                "invalid quarter {other}. valid quarters go from 1 to 4"
            ))),
        }
    }

    /// Quarter that contains the given day.
    pub fn containing(date: NaiveDate) -> Self {
        match date.month() {
            1..=3 => FiscalQuarter::Q1,
            4..=6 => FiscalQuarter::Q2,
            7..=9 => FiscalQuarter::Q3,
            _ => FiscalQuarter::Q4,
        }
    }

    /// First and last calendar day of the quarter as `(month, day)` pairs.
    fn bounds(self) -> ((u32, u32), (u32, u32)) {
        match self {
            FiscalQuarter::Q1 => ((1, 1), (3, 31)),
            FiscalQuarter::Q2 => ((4, 1), (6, 30)),
            FiscalQuarter::Q3 => ((7, 1), (9, 30)),
            FiscalQuarter::Q4 => ((10, 1), (12, 31)),
        }
    }

    /// The quarter's window in `year`, from the first day at midnight to the
    /// last nanosecond of its last day.
    pub fn window(self, year: i32) -> Result<TimeWindow> {
        let ((start_month, start_day), (end_month, end_day)) = self.bounds();
        let start = calendar_day(year, start_month, start_day)?;
        let end = calendar_day(year, end_month, end_day)?;
        TimeWindow::new(start_of_day(start), end_of_day(end)?)
    }
}

/// Resolves the window a sync run should cover.
///
/// - `from` and `to` must be given together; `to` is extended to the end of
///   its day.
/// - A non-zero `quarter` overrides explicit dates and selects that quarter of
///   the clock's current year. The dates are still parsed, but their order
///   is only checked when no quarter is set.
/// - Without either, the quarter containing the clock's "now" is used.
pub fn resolve(
    from: Option<&str>,
    to: Option<&str>,
    quarter: Option<i32>,
    clock: &dyn Clock,
) -> Result<TimeWindow> {
    let from = from.map(str::trim).filter(|value| !value.is_empty());
    let to = to.map(str::trim).filter(|value| !value.is_empty());

    let explicit = match (from, to) {
        (Some(from), Some(to)) => Some((parse_date(from)?, parse_date(to)?)),
        (None, None) => None,
        _ => {
            return Err(SyncError::Validation(
                "you must define both from and to".to_string(),
            ));
        }
    };

    let now = clock.now();

    if let Some(index) = quarter.filter(|index| *index != 0) {
        let quarter = FiscalQuarter::from_index(index)?;
        debug!(?quarter, year = now.year(), "resolved explicit quarter");
        return quarter.window(now.year());
    }

    if let Some((from, to)) = explicit {
        return TimeWindow::new(start_of_day(from), end_of_day(to)?);
    }

    let quarter = FiscalQuarter::containing(now.date_naive());
    debug!(?quarter, year = now.year(), "defaulted to current quarter");
    quarter.window(now.year())
}

/// Parses a `YYYY-MM-DD` calendar day.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, DATE_LAYOUT).map_err(|source| SyncError::Parse {
        input: input.to_string(),
        source,
    })
}

fn calendar_day(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| SyncError::Validation(format!("{year}-{month:02}-{day:02} is not a date")))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

fn end_of_day(date: NaiveDate) -> Result<DateTime<Utc>> {
    date.and_hms_nano_opt(23, 59, 59, 999_999_999)
        .map(|instant| instant.and_utc())
        .ok_or_else(|| SyncError::Validation(format!("cannot compute the end of {date}")))
}
