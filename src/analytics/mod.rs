// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Chart-ready time-series analytics.
//!
//! The backend aggregates device telemetry per period but returns sparse,
//! loosely shaped records. This module turns a response into a fixed set
//! of buckets (24 hours, 7 weekdays, the days of a month, 12 months) plus
//! summary figures:
//!
//! 1. [`RawSeries::from_json`] normalizes records into typed points.
//! 2. [`Series::bucketize`] zero-fills and sums them into buckets.
//! 3. [`Summary::compute`] derives totals, peak and savings.
//!
//! [`load_chart`] runs all three against a [`Backend`] and degrades every
//! failure into [`ChartData::NoData`].
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use iotdash::analytics::{ChartData, Metric, SeriesQuery, Window};
//!
//! let day = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
//! let query = SeriesQuery::new("light-12", Metric::Power, Window::Daily(day));
//!
//! let body = serde_json::json!({
//!     "success": true,
//!     "data": [{"hour": 8, "power": 1.2}, {"hour": 9, "power": 0.8}]
//! });
//!
//! let ChartData::Series(chart) = ChartData::from_response(&query, &body) else {
//!     panic!("expected data");
//! };
//! assert_eq!(chart.series.len(), 24);
//! assert!((chart.summary.total - 2.0).abs() < 1e-9);
//! ```

mod bucket;
mod normalize;
mod query;
mod summary;

pub use bucket::{Bucket, Series};
pub use normalize::{Period, RawSeries, ReportedSummary, SeriesPoint};
pub use query::{Metric, SeriesQuery, Timeframe, Window};
pub use summary::{Peak, Savings, Summary};

use serde_json::Value;

use crate::protocol::Backend;

/// A chart with its summary.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    /// The query the chart answers.
    pub query: SeriesQuery,
    /// The bucketed series.
    pub series: Series,
    /// Summary figures.
    pub summary: Summary,
}

/// What a chart panel renders.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    /// Data is available.
    Series(Chart),
    /// The "no data available" placeholder.
    NoData,
}

impl ChartData {
    /// Builds chart data from a response body.
    ///
    /// A body flagged `success: false` or without any data point yields
    /// [`ChartData::NoData`].
    #[must_use]
    pub fn from_response(query: &SeriesQuery, body: &Value) -> Self {
        let window = query.window();
        let raw = RawSeries::from_json(body, query.metric(), window.timeframe());

        if !raw.success || raw.points.is_empty() {
            tracing::debug!(
                metric = %query.metric(),
                device_id = %query.device_id(),
                success = raw.success,
                "No chart data"
            );
            return Self::NoData;
        }

        let series = Series::bucketize(&window, &raw.points);
        let summary = Summary::compute(&series, &raw.summary);

        Self::Series(Chart {
            query: query.clone(),
            series,
            summary,
        })
    }

    /// Returns `true` if there is nothing to chart.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoData)
    }

    /// Returns the chart, if there is one.
    #[must_use]
    pub fn chart(&self) -> Option<&Chart> {
        match self {
            Self::Series(chart) => Some(chart),
            Self::NoData => None,
        }
    }
}

/// Fetches and builds one chart.
///
/// Fetch errors are logged and turned into [`ChartData::NoData`]; analytics
/// failures never surface as errors.
pub async fn load_chart<B: Backend>(backend: &B, query: &SeriesQuery) -> ChartData {
    match backend.fetch_series(query).await {
        Ok(body) => ChartData::from_response(query, &body),
        Err(e) => {
            tracing::warn!(
                metric = %query.metric(),
                device_id = %query.device_id(),
                error = %e,
                "Chart fetch failed"
            );
            ChartData::NoData
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    fn daily() -> SeriesQuery {
        let day = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        SeriesQuery::new("d1", Metric::WorkingHours, Window::Daily(day))
    }

    #[test]
    fn unsuccessful_response_has_no_data() {
        let body = json!({"success": false, "data": [{"hour": 1, "hours": 1}]});
        assert!(ChartData::from_response(&daily(), &body).is_empty());
    }

    #[test]
    fn empty_data_has_no_data() {
        assert!(ChartData::from_response(&daily(), &json!({"success": true, "data": []})).is_empty());
        assert!(ChartData::from_response(&daily(), &Value::Null).is_empty());
    }

    #[test]
    fn chart_keeps_query() {
        let body = json!({"data": [{"hour": "08:00", "hours": 0.5}]});
        let data = ChartData::from_response(&daily(), &body);
        let chart = data.chart().unwrap();

        assert_eq!(chart.query, daily());
        assert!((chart.series.values()[8] - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn previous_day_records_stay_off_the_chart() {
        let body = json!({"data": [
            {"period": "2024-05-03T08:00:00", "hours": 1},
            {"period": "2024-05-02T08:00:00", "hours": 5}
        ]});
        let data = ChartData::from_response(&daily(), &body);
        let chart = data.chart().unwrap();

        assert!((chart.series.values()[8] - 1.0).abs() < f64::EPSILON);
        assert!((chart.summary.total - 1.0).abs() < f64::EPSILON);
    }
}
