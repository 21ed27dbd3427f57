// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Time-series response normalization.
//!
//! Turns a `{success, data: [...], summary?, baseline?}` response into typed
//! points. The field-name fallback chains for analytics live only here.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde_json::{Map, Value};

use crate::snapshot::{first, first_flag, first_number, parse_number, parse_string};

use super::{Metric, Timeframe};

const SUCCESS_KEYS: &[&str] = &["success", "ok"];
const DATA_KEYS: &[&str] = &["data", "series", "records", "results"];
const PERIOD_KEYS: &[&str] = &[
    "period", "hour", "day", "date", "month", "label", "time", "timestamp", "_id",
];
const BASELINE_KEYS: &[&str] = &[
    "baseline",
    "baselineConsumption",
    "baseline_consumption",
    "expected",
];
const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];
const TOTAL_KEYS: &[&str] = &["total", "totalValue", "total_value", "sum"];
const AVERAGE_KEYS: &[&str] = &["average", "avg", "mean"];
const PEAK_KEYS: &[&str] = &["peak", "max", "maximum"];

fn value_keys(metric: Metric) -> &'static [&'static str] {
    match metric {
        Metric::Power => &[
            "power", "energy", "consumption", "kwh", "totalPower", "value", "total",
        ],
        Metric::CarbonFootprint => &[
            "carbonFootprint",
            "carbon_footprint",
            "carbon",
            "co2",
            "emission",
            "emissions",
            "value",
            "total",
        ],
        Metric::WorkingHours => &[
            "workingHours",
            "working_hours",
            "hours",
            "runtime",
            "value",
            "total",
        ],
        Metric::Savings => &[
            "actual",
            "actualConsumption",
            "actual_consumption",
            "consumption",
            "energy",
            "value",
        ],
    }
}

/// Position of a data point inside its timeframe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Period {
    /// Hour of the day, as reported (0-23 when valid).
    Hour(u32),
    /// Day of the week.
    Weekday(Weekday),
    /// Day of the month, as reported (1-31 when valid).
    DayOfMonth(u32),
    /// Month of the year, as reported (1-12 when valid).
    Month(u32),
    /// A period key that could not be read.
    Unknown(String),
}

/// One normalized data point.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    /// Where the point belongs.
    pub period: Period,
    /// Calendar date of the point, when its period key carried one.
    pub date: Option<NaiveDate>,
    /// The metric value. Missing values read as zero.
    pub value: f64,
    /// Baseline value for the same period, if reported.
    pub baseline: Option<f64>,
}

/// Totals the backend computed itself.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReportedSummary {
    /// Sum over the window.
    pub total: Option<f64>,
    /// Mean per bucket.
    pub average: Option<f64>,
    /// Largest bucket value.
    pub peak: Option<f64>,
    /// Baseline total over the window.
    pub baseline: Option<f64>,
}

/// A normalized time-series response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSeries {
    /// `false` if the backend flagged the request as failed.
    pub success: bool,
    /// Data points in response order.
    pub points: Vec<SeriesPoint>,
    /// Totals the backend reported.
    pub summary: ReportedSummary,
}

impl RawSeries {
    /// Normalizes a response body.
    ///
    /// Never fails. A body that is not an object, or lacks a data array,
    /// yields no points. A missing `success` flag counts as success.
    #[must_use]
    pub fn from_json(body: &Value, metric: Metric, timeframe: Timeframe) -> Self {
        let (records, object) = match body {
            Value::Array(items) => (items.as_slice(), None),
            Value::Object(object) => {
                let records = first(object, DATA_KEYS)
                    .and_then(Value::as_array)
                    .map_or(&[][..], Vec::as_slice);
                (records, Some(object))
            }
            _ => (&[][..], None),
        };

        let success = object
            .and_then(|o| first_flag(o, SUCCESS_KEYS))
            .unwrap_or(true);
        let points = records
            .iter()
            .filter_map(Value::as_object)
            .map(|record| point(record, metric, timeframe))
            .collect();
        let summary = object.map(reported_summary).unwrap_or_default();

        Self {
            success,
            points,
            summary,
        }
    }
}

fn point(record: &Map<String, Value>, metric: Metric, timeframe: Timeframe) -> SeriesPoint {
    let (period, date) = first(record, PERIOD_KEYS).map_or_else(
        || (Period::Unknown(String::new()), None),
        |value| parse_period(value, timeframe),
    );
    SeriesPoint {
        period,
        date,
        value: first_number(record, value_keys(metric)).unwrap_or(0.0),
        baseline: first_number(record, BASELINE_KEYS),
    }
}

fn reported_summary(object: &Map<String, Value>) -> ReportedSummary {
    let summary = object.get("summary").and_then(Value::as_object);
    let from_summary = |keys: &[&str]| summary.and_then(|s| first_number(s, keys));

    // Top-level baseline may be a plain number or an object with a total
    let baseline = match object.get("baseline") {
        Some(Value::Object(inner)) => first_number(inner, TOTAL_KEYS),
        Some(value) => parse_number(value),
        None => None,
    }
    .or_else(|| from_summary(BASELINE_KEYS));

    ReportedSummary {
        total: from_summary(TOTAL_KEYS),
        average: from_summary(AVERAGE_KEYS),
        peak: from_summary(PEAK_KEYS),
        baseline,
    }
}

/// Reads a period key in the context of `timeframe`.
///
/// Accepted forms: bare numbers (hour, ISO weekday with Monday as 1, day of
/// month, month), `HH:MM`, dates, date-times, `YYYY-MM`, and weekday or
/// month names. Dated forms also return their calendar date.
pub(crate) fn parse_period(value: &Value, timeframe: Timeframe) -> (Period, Option<NaiveDate>) {
    let Some(text) = parse_string(value) else {
        return (Period::Unknown(value.to_string()), None);
    };

    if let Some(n) = parse_number(value).filter(|n| n.fract().abs() < f64::EPSILON && *n >= 0.0) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        // Safe: non-negative integral value, clamped to u32
        let n = n.min(f64::from(u32::MAX)) as u32;
        return (from_index(n, timeframe).unwrap_or(Period::Unknown(text)), None);
    }

    if let Some((period, date)) = from_datetime(&text, timeframe)
        .or_else(|| from_date(&text, timeframe))
        .or_else(|| from_year_month(&text, timeframe))
    {
        return (period, Some(date));
    }

    let period = from_clock(&text, timeframe)
        .or_else(|| from_name(&text, timeframe))
        .unwrap_or(Period::Unknown(text));
    (period, None)
}

fn from_index(n: u32, timeframe: Timeframe) -> Option<Period> {
    match timeframe {
        Timeframe::Daily => Some(Period::Hour(n)),
        Timeframe::Weekly => usize::try_from(n)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| WEEK.get(i).copied())
            .map(Period::Weekday),
        Timeframe::Monthly => Some(Period::DayOfMonth(n)),
        Timeframe::Yearly => Some(Period::Month(n)),
    }
}

fn from_datetime(text: &str, timeframe: Timeframe) -> Option<(Period, NaiveDate)> {
    let datetime = DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M"))
        .ok()?;

    let date = datetime.date();
    let period = match timeframe {
        Timeframe::Daily => Period::Hour(datetime.hour()),
        _ => from_naive_date(date, timeframe),
    };
    Some((period, date))
}

fn from_date(text: &str, timeframe: Timeframe) -> Option<(Period, NaiveDate)> {
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    match timeframe {
        // A bare date says nothing about the hour
        Timeframe::Daily => None,
        _ => Some((from_naive_date(date, timeframe), date)),
    }
}

fn from_naive_date(date: NaiveDate, timeframe: Timeframe) -> Period {
    match timeframe {
        Timeframe::Weekly => Period::Weekday(date.weekday()),
        Timeframe::Yearly => Period::Month(date.month()),
        Timeframe::Daily | Timeframe::Monthly => Period::DayOfMonth(date.day()),
    }
}

fn from_clock(text: &str, timeframe: Timeframe) -> Option<Period> {
    if timeframe != Timeframe::Daily {
        return None;
    }
    let (hour, minute) = text.split_once(':')?;
    let minute = minute.split(':').next()?;
    if minute.len() != 2 || !minute.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    hour.trim().parse::<u32>().ok().map(Period::Hour)
}

fn from_year_month(text: &str, timeframe: Timeframe) -> Option<(Period, NaiveDate)> {
    if timeframe != Timeframe::Yearly {
        return None;
    }
    let (year, month) = text.split_once('-')?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month = month.parse::<u32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month, 1)?;
    Some((Period::Month(month), date))
}

fn from_name(text: &str, timeframe: Timeframe) -> Option<Period> {
    match timeframe {
        Timeframe::Weekly => text.parse::<Weekday>().ok().map(Period::Weekday),
        Timeframe::Yearly => text
            .parse::<chrono::Month>()
            .ok()
            .map(|month| Period::Month(month.number_from_month())),
        Timeframe::Daily | Timeframe::Monthly => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_envelope_and_points() {
        let body = json!({
            "success": true,
            "data": [
                {"hour": 8, "power": 1.5},
                {"period": "09:00", "energy": "2.25"},
                {"period": "2024-05-03T10:00:00Z", "value": 3}
            ],
            "summary": {"total": 6.75, "avg": 2.25}
        });

        let series = RawSeries::from_json(&body, Metric::Power, Timeframe::Daily);

        assert!(series.success);
        assert_eq!(series.points.len(), 3);
        assert_eq!(series.points[0].period, Period::Hour(8));
        assert_eq!(series.points[1].period, Period::Hour(9));
        assert!((series.points[1].value - 2.25).abs() < f64::EPSILON);
        assert_eq!(series.points[2].period, Period::Hour(10));
        assert_eq!(series.summary.total, Some(6.75));
        assert_eq!(series.summary.average, Some(2.25));
        assert_eq!(series.summary.peak, None);
    }

    #[test]
    fn failure_flag_and_missing_data() {
        let series = RawSeries::from_json(
            &json!({"success": false, "message": "no meter"}),
            Metric::Power,
            Timeframe::Weekly,
        );
        assert!(!series.success);
        assert!(series.points.is_empty());

        let series = RawSeries::from_json(&Value::Null, Metric::Power, Timeframe::Weekly);
        assert!(series.success);
        assert!(series.points.is_empty());
    }

    #[test]
    fn bare_array_body() {
        let series = RawSeries::from_json(
            &json!([{"month": "Mar", "hours": 120}]),
            Metric::WorkingHours,
            Timeframe::Yearly,
        );
        assert_eq!(series.points[0].period, Period::Month(3));
        assert!((series.points[0].value - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn savings_points_carry_baseline() {
        let body = json!({
            "data": [{"day": "2024-05-06", "actual": 8, "baseline": 10}],
            "baseline": {"total": 70}
        });
        let series = RawSeries::from_json(&body, Metric::Savings, Timeframe::Weekly);

        assert_eq!(series.points[0].period, Period::Weekday(Weekday::Mon));
        assert_eq!(series.points[0].baseline, Some(10.0));
        assert_eq!(series.summary.baseline, Some(70.0));
    }

    #[test]
    fn missing_value_reads_as_zero() {
        let series = RawSeries::from_json(
            &json!({"data": [{"period": 4}]}),
            Metric::CarbonFootprint,
            Timeframe::Monthly,
        );
        assert_eq!(series.points[0].period, Period::DayOfMonth(4));
        assert!(series.points[0].value.abs() < f64::EPSILON);
    }

    #[test]
    fn period_forms() {
        let weekly = |v: Value| parse_period(&v, Timeframe::Weekly).0;
        assert_eq!(weekly(json!(1)), Period::Weekday(Weekday::Mon));
        assert_eq!(weekly(json!(7)), Period::Weekday(Weekday::Sun));
        assert_eq!(weekly(json!("Friday")), Period::Weekday(Weekday::Fri));
        assert!(matches!(weekly(json!(0)), Period::Unknown(_)));

        let yearly = |v: Value| parse_period(&v, Timeframe::Yearly).0;
        assert_eq!(yearly(json!("2024-11")), Period::Month(11));
        assert_eq!(yearly(json!("december")), Period::Month(12));
        assert_eq!(yearly(json!("2024-02-15")), Period::Month(2));

        let monthly = |v: Value| parse_period(&v, Timeframe::Monthly).0;
        assert_eq!(monthly(json!("2024-02-15")), Period::DayOfMonth(15));
        assert_eq!(monthly(json!("17")), Period::DayOfMonth(17));

        let daily = |v: Value| parse_period(&v, Timeframe::Daily).0;
        assert_eq!(daily(json!("2024-05-03 14:30")), Period::Hour(14));
        assert!(matches!(daily(json!("2024-05-03")), Period::Unknown(_)));
        assert!(matches!(daily(json!("noon")), Period::Unknown(_)));
    }

    #[test]
    fn dated_periods_keep_their_date() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);

        let (period, day) = parse_period(&json!("2024-05-02T08:00:00"), Timeframe::Daily);
        assert_eq!(period, Period::Hour(8));
        assert_eq!(day, date(2024, 5, 2));

        let (_, day) = parse_period(&json!("2024-03-15"), Timeframe::Monthly);
        assert_eq!(day, date(2024, 3, 15));

        let (period, day) = parse_period(&json!("2023-11"), Timeframe::Yearly);
        assert_eq!(period, Period::Month(11));
        assert_eq!(day, date(2023, 11, 1));

        assert_eq!(parse_period(&json!(8), Timeframe::Daily).1, None);
        assert_eq!(parse_period(&json!("Mar"), Timeframe::Yearly).1, None);
        assert_eq!(parse_period(&json!("09:00"), Timeframe::Daily).1, None);
    }
}
