//! Date-range filtering for the ready-orders report

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use kds_types::Order;
use serde::Serialize;

/// Named reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case", tag = "range")]
pub enum DateRange {
    /// Local midnight through now
    #[default]
    Today,
    /// Now minus 7×24h through now
    Last7Days,
    /// Now minus 30×24h through now
    Last30Days,
    /// Everything, including undated orders
    AllTime,
    /// Inclusive calendar dates in local time; either end may be open
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl DateRange {
    /// Custom range; bounds given in the wrong order are swapped
    pub fn custom(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        match (start, end) {
            (Some(s), Some(e)) if s > e => Self::Custom {
                start: Some(e),
                end: Some(s),
            },
            _ => Self::Custom { start, end },
        }
    }

    /// Resolve to absolute `[from, to]` bounds relative to `now`
    ///
    /// Returns `None` when the range is unbounded (all time, or a custom
    /// range with neither date set).
    pub fn bounds<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let now_utc = now.with_timezone(&Utc);
        match *self {
            Self::Today => {
                let midnight = now.date_naive().and_time(chrono::NaiveTime::MIN);
                Some((local_to_utc(now, midnight, true), now_utc))
            }
            Self::Last7Days => Some((now_utc - Duration::days(7), now_utc)),
            Self::Last30Days => Some((now_utc - Duration::days(30), now_utc)),
            Self::AllTime => None,
            Self::Custom {
                start: None,
                end: None,
            } => None,
            Self::Custom { start, end } => {
                let from = start
                    .map(|d| local_to_utc(now, d.and_time(chrono::NaiveTime::MIN), true))
                    .unwrap_or(DateTime::UNIX_EPOCH);
                let to = end
                    .and_then(|d| d.and_hms_nano_opt(23, 59, 59, 999_999_999))
                    .map(|end_of_day| local_to_utc(now, end_of_day, false))
                    .unwrap_or(now_utc);
                Some((from, to))
            }
        }
    }

    /// Returns true if an order dated `date` falls in this range
    pub fn contains<Tz: TimeZone>(&self, date: Option<DateTime<Utc>>, now: &DateTime<Tz>) -> bool {
        within(self.bounds(now), date)
    }

    /// Human-readable label
    pub fn label(&self) -> String {
        match self {
            Self::Today => "Hoy".to_string(),
            Self::Last7Days => "Últimos 7 días".to_string(),
            Self::Last30Days => "Últimos 30 días".to_string(),
            Self::AllTime => "Todo".to_string(),
            Self::Custom { start, end } => {
                let fmt = |d: &Option<NaiveDate>| {
                    d.map(|d| d.format("%d/%m/%Y").to_string())
                        .unwrap_or_else(|| "...".to_string())
                };
                format!("{} a {}", fmt(start), fmt(end))
            }
        }
    }

    /// Next preset in selector order; a custom range cycles back to today
    pub fn next(&self) -> Self {
        match self {
            Self::Today => Self::Last7Days,
            Self::Last7Days => Self::Last30Days,
            Self::Last30Days => Self::AllTime,
            Self::AllTime => Self::Custom {
                start: None,
                end: None,
            },
            Self::Custom { .. } => Self::Today,
        }
    }

    /// Returns true for a custom range
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }
}

fn within(bounds: Option<(DateTime<Utc>, DateTime<Utc>)>, date: Option<DateTime<Utc>>) -> bool {
    match (bounds, date) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some((from, to)), Some(date)) => date >= from && date <= to,
    }
}

/// Map a local wall-clock time to UTC in `now`'s zone
///
/// Ambiguous times take the earliest (start bounds) or latest (end bounds)
/// instant. Times that fall into a DST gap reuse `now`'s offset.
fn local_to_utc<Tz: TimeZone>(now: &DateTime<Tz>, local: NaiveDateTime, earliest: bool) -> DateTime<Utc> {
    let resolved = now.timezone().from_local_datetime(&local);
    let picked = if earliest {
        resolved.earliest()
    } else {
        resolved.latest()
    };
    match picked {
        Some(dt) => dt.with_timezone(&Utc),
        None => {
            let offset = now.naive_local() - now.naive_utc();
            (local - offset).and_utc()
        }
    }
}

/// Orders whose resolved date lies in `range`, in input order
pub fn filter_by_range<'a, Tz, I>(orders: I, range: &DateRange, now: &DateTime<Tz>) -> Vec<&'a Order>
where
    Tz: TimeZone,
    I: IntoIterator<Item = &'a Order>,
{
    let bounds = range.bounds(now);
    orders
        .into_iter()
        .filter(|o| within(bounds, o.resolved_date()))
        .collect()
}
