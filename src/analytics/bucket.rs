// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed-size chart buckets.

use serde::Serialize;

use super::{Period, SeriesPoint, Timeframe, Window};

const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One chart bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    /// Axis label, e.g. `"08:00"`, `"Mon"`, `"17"` or `"Mar"`.
    pub label: String,
    /// Summed metric value. Zero when no data point fell into the bucket.
    pub value: f64,
    /// Summed baseline, if any data point in the bucket carried one.
    pub baseline: Option<f64>,
}

/// A chart-ready series with exactly one bucket per period of its window.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use iotdash::analytics::{Period, Series, SeriesPoint, Window};
///
/// let day = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
/// let points: Vec<SeriesPoint> = (8..=11)
///     .map(|hour| SeriesPoint {
///         period: Period::Hour(hour),
///         date: None,
///         value: 1.0,
///         baseline: None,
///     })
///     .collect();
///
/// let series = Series::bucketize(&Window::Daily(day), &points);
/// assert_eq!(series.len(), 24);
/// assert_eq!(series.values()[7], 0.0);
/// assert_eq!(series.values()[8], 1.0);
/// assert_eq!(series.buckets()[8].label, "08:00");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    timeframe: Timeframe,
    buckets: Vec<Bucket>,
}

impl Series {
    /// Places `points` into the fixed buckets of `window`.
    ///
    /// Buckets without data are zero. Points sharing a bucket are summed.
    /// Points outside the window are dropped: hour 24, day 31 of a 30-day
    /// month, unreadable keys, and dated points from another day, week,
    /// month or year than the window's anchor.
    #[must_use]
    pub fn bucketize(window: &Window, points: &[SeriesPoint]) -> Self {
        let timeframe = window.timeframe();
        let count = window.bucket_count();
        let mut buckets: Vec<Bucket> = (0..count)
            .map(|index| Bucket {
                label: label(timeframe, index),
                value: 0.0,
                baseline: None,
            })
            .collect();

        for point in points {
            let Some(bucket) = point
                .date
                .is_none_or(|date| window.contains(date))
                .then(|| index_of(&point.period, timeframe))
                .flatten()
                .and_then(|i| buckets.get_mut(i))
            else {
                tracing::debug!(
                    period = ?point.period,
                    date = ?point.date,
                    timeframe = %timeframe,
                    "Dropping data point outside the chart window"
                );
                continue;
            };
            bucket.value += point.value;
            if let Some(baseline) = point.baseline {
                *bucket.baseline.get_or_insert(0.0) += baseline;
            }
        }

        Self { timeframe, buckets }
    }

    /// Returns the timeframe.
    #[must_use]
    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Returns the buckets in axis order.
    #[must_use]
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Returns the bucket values in axis order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.buckets.iter().map(|b| b.value).collect()
    }

    /// Returns the bucket labels in axis order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.label.as_str()).collect()
    }

    /// Returns the number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if the series has no buckets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

fn index_of(period: &Period, timeframe: Timeframe) -> Option<usize> {
    let index = match (timeframe, period) {
        (Timeframe::Daily, Period::Hour(hour)) => *hour,
        (Timeframe::Weekly, Period::Weekday(day)) => day.num_days_from_monday(),
        (Timeframe::Monthly, Period::DayOfMonth(day)) => day.checked_sub(1)?,
        (Timeframe::Yearly, Period::Month(month)) => month.checked_sub(1)?,
        _ => return None,
    };
    usize::try_from(index).ok()
}

fn label(timeframe: Timeframe, index: usize) -> String {
    match timeframe {
        Timeframe::Daily => format!("{index:02}:00"),
        Timeframe::Weekly => WEEKDAY_LABELS[index % 7].to_string(),
        Timeframe::Monthly => (index + 1).to_string(),
        Timeframe::Yearly => MONTH_LABELS[index % 12].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Weekday};

    use super::*;

    fn point(period: Period, value: f64) -> SeriesPoint {
        SeriesPoint {
            period,
            date: None,
            value,
            baseline: None,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()
    }

    #[test]
    fn daily_sparse_hours_are_zero_filled() {
        let points = vec![
            point(Period::Hour(8), 1.25),
            point(Period::Hour(9), 2.5),
            point(Period::Hour(10), 3.75),
            point(Period::Hour(11), 5.0),
        ];

        let series = Series::bucketize(&Window::Daily(day()), &points);
        let values = series.values();

        assert_eq!(values.len(), 24);
        assert_eq!(&values[8..12], &[1.25, 2.5, 3.75, 5.0]);
        for (hour, value) in values.iter().enumerate() {
            if !(8..12).contains(&hour) {
                assert!(value.abs() < f64::EPSILON, "hour {hour} should be zero");
            }
        }
        assert_eq!(series.labels()[0], "00:00");
        assert_eq!(series.labels()[23], "23:00");
    }

    #[test]
    fn duplicates_are_summed() {
        let points = vec![point(Period::Hour(3), 1.0), point(Period::Hour(3), 2.0)];
        let series = Series::bucketize(&Window::Daily(day()), &points);
        assert!((series.values()[3] - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_periods_are_dropped() {
        let points = vec![
            point(Period::Hour(24), 9.0),
            point(Period::Unknown("noon".to_string()), 9.0),
            point(Period::Month(3), 9.0),
        ];
        let series = Series::bucketize(&Window::Daily(day()), &points);
        assert!(series.values().iter().all(|v| v.abs() < f64::EPSILON));
    }

    #[test]
    fn points_dated_outside_the_window_are_dropped() {
        let dated = |period, date: NaiveDate, value| SeriesPoint {
            date: Some(date),
            ..point(period, value)
        };
        let may = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();

        let points = vec![
            dated(Period::Hour(8), may(3), 1.0),
            dated(Period::Hour(8), may(2), 5.0),
        ];
        let series = Series::bucketize(&Window::Daily(day()), &points);
        assert!((series.values()[8] - 1.0).abs() < f64::EPSILON);

        let february = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let march = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let series = Series::bucketize(
            &Window::Monthly(Some(february)),
            &[dated(Period::DayOfMonth(15), march, 7.0)],
        );
        assert!(series.values().iter().all(|v| v.abs() < f64::EPSILON));

        // No anchor: the backend picked the period, so every date is kept
        let series = Series::bucketize(
            &Window::Monthly(None),
            &[dated(Period::DayOfMonth(15), march, 7.0)],
        );
        assert!((series.values()[14] - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn weekly_starts_monday() {
        let points = vec![
            point(Period::Weekday(Weekday::Mon), 1.0),
            point(Period::Weekday(Weekday::Sun), 7.0),
        ];
        let series = Series::bucketize(&Window::Weekly(None), &points);

        assert_eq!(series.labels(), ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
        assert!((series.values()[0] - 1.0).abs() < f64::EPSILON);
        assert!((series.values()[6] - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn monthly_follows_month_length() {
        let april = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let points = vec![
            point(Period::DayOfMonth(1), 1.0),
            point(Period::DayOfMonth(30), 2.0),
            point(Period::DayOfMonth(31), 4.0),
            point(Period::DayOfMonth(0), 8.0),
        ];
        let series = Series::bucketize(&Window::Monthly(Some(april)), &points);

        assert_eq!(series.len(), 30);
        assert_eq!(series.labels()[29], "30");
        assert!((series.values().iter().sum::<f64>() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn yearly_baselines_accumulate() {
        let points = vec![
            SeriesPoint {
                period: Period::Month(2),
                date: None,
                value: 5.0,
                baseline: Some(6.0),
            },
            SeriesPoint {
                period: Period::Month(2),
                date: None,
                value: 1.0,
                baseline: Some(1.5),
            },
        ];
        let series = Series::bucketize(&Window::Yearly(None), &points);

        assert_eq!(series.len(), 12);
        assert_eq!(series.buckets()[1].label, "Feb");
        assert_eq!(series.buckets()[1].baseline, Some(7.5));
        assert_eq!(series.buckets()[0].baseline, None);
    }
}
