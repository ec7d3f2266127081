//! Time window partitioning
//!
//! A single search is capped server-side at 10,000 results. Splitting the
//! requested window into smaller chunks and searching each one separately
//! keeps every individual search under that cap.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use newscatcher_client_rs::chunking::{ChunkSize, TimeWindow};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2024, 1, 2, 1, 0, 0).unwrap();
//! let window = TimeWindow::new(start, end).unwrap();
//!
//! let chunks: Vec<_> = window.chunks(ChunkSize::parse("1d").unwrap()).collect();
//! assert_eq!(chunks.len(), 2);
//! assert_eq!(chunks[1].duration().num_hours(), 1);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use regex::Regex;

use crate::error::{NewsCatcherError, Result};

/// Timestamp layout accepted by the search API for `from_` and `to`
pub const API_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static CHUNK_SIZE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([hd])$").expect("valid chunk size pattern"));

static RELATIVE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([mhd])$").expect("valid relative time pattern"));

/// Format a timestamp the way the search API expects it
pub fn format_api_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(API_TIMESTAMP_FORMAT).to_string()
}

fn unit_delta(amount: i64, unit: &str) -> Option<TimeDelta> {
    match unit {
        "m" => TimeDelta::try_minutes(amount),
        "h" => TimeDelta::try_hours(amount),
        "d" => TimeDelta::try_days(amount),
        _ => None,
    }
}

/// One end of a requested time range
///
/// Either an absolute instant or a textual expression resolved against the
/// current time when retrieval starts.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeBound {
    Absolute(DateTime<Utc>),
    /// `"7d"`, `"24h"`, `"30m"` (that long before now), an RFC 3339
    /// timestamp, `"YYYY-MM-DD HH:MM:SS"` or `"YYYY-MM-DD"`
    Expression(String),
}

impl TimeBound {
    /// Resolve this bound to an instant, taking relative expressions from `now`
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        match self {
            TimeBound::Absolute(timestamp) => Ok(*timestamp),
            TimeBound::Expression(expr) => resolve_expression(expr.trim(), now),
        }
    }
}

fn resolve_expression(expr: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if let Some(caps) = RELATIVE_PATTERN.captures(expr) {
        let resolved = caps[1]
            .parse::<i64>()
            .ok()
            .and_then(|amount| unit_delta(amount, &caps[2]))
            .and_then(|delta| now.checked_sub_signed(delta));
        return resolved.ok_or_else(|| NewsCatcherError::InvalidTimeRange {
            message: format!("relative time {expr:?} is out of range"),
        });
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(expr) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    for layout in [API_TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(expr, layout) {
            return Ok(naive.and_utc());
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(expr, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(NewsCatcherError::InvalidTimeRange {
        message: format!("cannot parse time bound {expr:?}"),
    })
}

/// Resolve a relative lookback such as `"7d"` or `"12h"` against `now`
///
/// Unlike [`TimeBound`], absolute timestamps are not accepted.
pub fn resolve_lookback(expr: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let expr = expr.trim();
    if !RELATIVE_PATTERN.is_match(expr) {
        return Err(NewsCatcherError::InvalidTimeRange {
            message: format!("lookback {expr:?} must be relative, e.g. \"7d\" or \"12h\""),
        });
    }
    resolve_expression(expr, now)
}

impl From<DateTime<Utc>> for TimeBound {
    fn from(timestamp: DateTime<Utc>) -> Self {
        TimeBound::Absolute(timestamp)
    }
}

impl From<&str> for TimeBound {
    fn from(expr: &str) -> Self {
        TimeBound::Expression(expr.to_string())
    }
}

impl From<String> for TimeBound {
    fn from(expr: String) -> Self {
        TimeBound::Expression(expr)
    }
}

/// Length of one chunk, in whole hours or days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSize(TimeDelta);

impl ChunkSize {
    /// Parse `"<n>h"` or `"<n>d"` with `n > 0`
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: &str| NewsCatcherError::InvalidDuration {
            value: input.to_string(),
            reason: reason.to_string(),
        };

        let caps = CHUNK_SIZE_PATTERN
            .captures(input.trim())
            .ok_or_else(|| invalid("expected a whole number of hours or days, e.g. \"1h\" or \"1d\""))?;

        let amount = caps[1]
            .parse::<i64>()
            .map_err(|_| invalid("amount is too large"))?;
        if amount == 0 {
            return Err(invalid("must be positive"));
        }

        unit_delta(amount, &caps[2])
            .map(ChunkSize)
            .ok_or_else(|| invalid("amount is too large"))
    }

    pub fn as_delta(&self) -> TimeDelta {
        self.0
    }
}

impl FromStr for ChunkSize {
    type Err = NewsCatcherError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0.num_hours();
        if hours % 24 == 0 {
            write!(f, "{}d", hours / 24)
        } else {
            write!(f, "{hours}h")
        }
    }
}

/// Half-open interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window, failing if `start` is after `end`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(NewsCatcherError::InvalidTimeRange {
                message: format!(
                    "start {} is after end {}",
                    format_api_timestamp(&start),
                    format_api_timestamp(&end)
                ),
            });
        }
        Ok(Self { start, end })
    }

    /// Resolve both bounds against `now` and build the window
    pub fn resolve(from: &TimeBound, to: &TimeBound, now: DateTime<Utc>) -> Result<Self> {
        Self::new(from.resolve(now)?, to.resolve(now)?)
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `from_` request value
    pub fn from_param(&self) -> String {
        format_api_timestamp(&self.start)
    }

    /// `to` request value
    pub fn to_param(&self) -> String {
        format_api_timestamp(&self.end)
    }

    /// Split into consecutive chunks of at most `size`
    pub fn chunks(&self, size: ChunkSize) -> TimeChunks {
        TimeChunks {
            cursor: self.start,
            end: self.end,
            step: size.as_delta(),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from_param(), self.to_param())
    }
}

/// Partition `window` using a textual chunk size such as `"1h"` or `"1d"`
pub fn partition(window: &TimeWindow, chunk_size: &str) -> Result<TimeChunks> {
    Ok(window.chunks(ChunkSize::parse(chunk_size)?))
}

/// Lazy, earliest-first sequence of chunks; the last one may be shorter
#[derive(Debug, Clone)]
pub struct TimeChunks {
    cursor: DateTime<Utc>,
    end: DateTime<Utc>,
    step: TimeDelta,
}

impl Iterator for TimeChunks {
    type Item = TimeWindow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.end {
            return None;
        }

        let start = self.cursor;
        let end = start
            .checked_add_signed(self.step)
            .map_or(self.end, |next| next.min(self.end));
        self.cursor = end;
        Some(TimeWindow { start, end })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.cursor).num_seconds().max(0);
        let step = self.step.num_seconds().max(1);
        let count = ((remaining + step - 1) / step) as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for TimeChunks {}

/// Relative lookback from `reference` back to `start`, as the headlines `when` value
///
/// Rounded up to whole hours; expressed in days when it is a whole number of days.
pub fn lookback_expression(reference: DateTime<Utc>, start: DateTime<Utc>) -> String {
    let seconds = (reference - start).num_seconds().max(0);
    let hours = ((seconds + 3599) / 3600).max(1);
    if hours % 24 == 0 {
        format!("{}d", hours / 24)
    } else {
        format!("{hours}h")
    }
}
