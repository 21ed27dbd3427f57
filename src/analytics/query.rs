// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Time-series query types.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::types::DeviceId;

/// Aggregated quantity shown on an analytics chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    /// Energy consumption in kWh.
    Power,
    /// CO₂ equivalent in kg.
    CarbonFootprint,
    /// Hours the load was switched on.
    WorkingHours,
    /// Consumption compared against a baseline.
    Savings,
}

impl Metric {
    /// All metrics, in display order.
    pub const ALL: [Self; 4] = [
        Self::Power,
        Self::CarbonFootprint,
        Self::WorkingHours,
        Self::Savings,
    ];

    /// Returns the endpoint path segment.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::CarbonFootprint => "carbon-footprint",
            Self::WorkingHours => "working-hours",
            Self::Savings => "savings",
        }
    }

    /// Returns the display unit of bucket values.
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::Power | Self::Savings => "kWh",
            Self::CarbonFootprint => "kg CO₂",
            Self::WorkingHours => "h",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "power" | "energy" | "consumption" => Ok(Self::Power),
            "carbonfootprint" | "carbon" | "co2" => Ok(Self::CarbonFootprint),
            "workinghours" | "hours" | "runtime" => Ok(Self::WorkingHours),
            "savings" | "saving" => Ok(Self::Savings),
            _ => Err(ValueError::InvalidMetric(s.to_string())),
        }
    }
}

/// Granularity of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// 24 hourly buckets of one day.
    Daily,
    /// 7 daily buckets, Monday first.
    Weekly,
    /// One bucket per day of the month.
    Monthly,
    /// 12 monthly buckets.
    Yearly,
}

impl Timeframe {
    /// Returns the endpoint path segment.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "year" | "annual" => Ok(Self::Yearly),
            _ => Err(ValueError::InvalidTimeframe(s.to_string())),
        }
    }
}

/// A timeframe with its anchor date.
///
/// Daily windows always carry the day they cover. The other timeframes may
/// carry an anchor; without one the backend picks the current period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    /// The day to chart.
    Daily(NaiveDate),
    /// Any date inside the week to chart.
    Weekly(Option<NaiveDate>),
    /// Any date inside the month to chart.
    Monthly(Option<NaiveDate>),
    /// Any date inside the year to chart.
    Yearly(Option<NaiveDate>),
}

impl Window {
    /// Builds a window from a timeframe and an optional date.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::MissingDate` for a daily window without a date.
    pub fn new(timeframe: Timeframe, date: Option<NaiveDate>) -> Result<Self, ValueError> {
        match timeframe {
            Timeframe::Daily => date.map(Self::Daily).ok_or(ValueError::MissingDate),
            Timeframe::Weekly => Ok(Self::Weekly(date)),
            Timeframe::Monthly => Ok(Self::Monthly(date)),
            Timeframe::Yearly => Ok(Self::Yearly(date)),
        }
    }

    /// Returns the timeframe.
    #[must_use]
    pub const fn timeframe(&self) -> Timeframe {
        match self {
            Self::Daily(_) => Timeframe::Daily,
            Self::Weekly(_) => Timeframe::Weekly,
            Self::Monthly(_) => Timeframe::Monthly,
            Self::Yearly(_) => Timeframe::Yearly,
        }
    }

    /// Returns the anchor date, if any.
    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Daily(date) => Some(*date),
            Self::Weekly(date) | Self::Monthly(date) | Self::Yearly(date) => *date,
        }
    }

    /// Returns `true` if `date` falls inside the window.
    ///
    /// Weeks are ISO weeks. Windows without an anchor accept any date.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Self::Daily(day) => date == day,
            Self::Weekly(anchor) => anchor.is_none_or(|a| a.iso_week() == date.iso_week()),
            Self::Monthly(anchor) => {
                anchor.is_none_or(|a| (a.year(), a.month()) == (date.year(), date.month()))
            }
            Self::Yearly(anchor) => anchor.is_none_or(|a| a.year() == date.year()),
        }
    }

    /// Returns the number of chart buckets.
    ///
    /// Monthly windows have as many buckets as their month has days, or 31
    /// without an anchor.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        match self {
            Self::Daily(_) => 24,
            Self::Weekly(_) => 7,
            Self::Monthly(date) => date.map_or(31, days_in_month),
            Self::Yearly(_) => 12,
        }
    }
}

fn days_in_month(date: NaiveDate) -> usize {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .map_or(31, |last| last.day() as usize)
}

/// One chart request.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use iotdash::analytics::{Metric, SeriesQuery, Window};
///
/// let date = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
/// let query = SeriesQuery::new("light-12", Metric::CarbonFootprint, Window::Daily(date));
///
/// assert_eq!(query.path(), "/carbon-footprint/light-12/daily");
/// assert_eq!(query.date(), Some(date));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesQuery {
    device_id: DeviceId,
    metric: Metric,
    window: Window,
}

impl SeriesQuery {
    /// Creates a query.
    #[must_use]
    pub fn new(device_id: impl Into<DeviceId>, metric: Metric, window: Window) -> Self {
        Self {
            device_id: device_id.into(),
            metric,
            window,
        }
    }

    /// Returns the device.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Returns the metric.
    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Returns the window.
    #[must_use]
    pub fn window(&self) -> Window {
        self.window
    }

    /// Returns the anchor date sent as the `date` query parameter.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.window.date()
    }

    /// Returns the endpoint path, without the query string.
    #[must_use]
    pub fn path(&self) -> String {
        format!(
            "/{}/{}/{}",
            self.metric,
            urlencoding::encode(self.device_id.as_str()),
            self.window.timeframe()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn metric_parsing() {
        assert_eq!("working-hours".parse::<Metric>().unwrap(), Metric::WorkingHours);
        assert_eq!("carbonFootprint".parse::<Metric>().unwrap(), Metric::CarbonFootprint);
        assert_eq!("CO2".parse::<Metric>().unwrap(), Metric::CarbonFootprint);
        assert!("volts".parse::<Metric>().is_err());
    }

    #[test]
    fn timeframe_parsing() {
        assert_eq!("Weekly".parse::<Timeframe>().unwrap(), Timeframe::Weekly);
        assert!(matches!(
            "hourly".parse::<Timeframe>(),
            Err(ValueError::InvalidTimeframe(_))
        ));
    }

    #[test]
    fn daily_window_requires_date() {
        assert_eq!(
            Window::new(Timeframe::Daily, None),
            Err(ValueError::MissingDate)
        );
        let window = Window::new(Timeframe::Daily, Some(date(2024, 1, 2))).unwrap();
        assert_eq!(window.bucket_count(), 24);
    }

    #[test]
    fn monthly_bucket_count_follows_calendar() {
        assert_eq!(Window::Monthly(Some(date(2024, 2, 10))).bucket_count(), 29);
        assert_eq!(Window::Monthly(Some(date(2023, 2, 10))).bucket_count(), 28);
        assert_eq!(Window::Monthly(Some(date(2024, 4, 30))).bucket_count(), 30);
        assert_eq!(Window::Monthly(Some(date(2024, 12, 1))).bucket_count(), 31);
        assert_eq!(Window::Monthly(None).bucket_count(), 31);
    }

    #[test]
    fn window_contains_anchored_period_only() {
        let daily = Window::Daily(date(2024, 5, 3));
        assert!(daily.contains(date(2024, 5, 3)));
        assert!(!daily.contains(date(2024, 5, 2)));

        // 2024-05-03 is a Friday; its ISO week runs Mon 04-29 to Sun 05-05
        let weekly = Window::Weekly(Some(date(2024, 5, 3)));
        assert!(weekly.contains(date(2024, 4, 29)));
        assert!(weekly.contains(date(2024, 5, 5)));
        assert!(!weekly.contains(date(2024, 5, 6)));

        let monthly = Window::Monthly(Some(date(2024, 2, 1)));
        assert!(monthly.contains(date(2024, 2, 29)));
        assert!(!monthly.contains(date(2024, 3, 15)));
        assert!(!monthly.contains(date(2023, 2, 15)));

        let yearly = Window::Yearly(Some(date(2024, 7, 1)));
        assert!(yearly.contains(date(2024, 1, 1)));
        assert!(!yearly.contains(date(2025, 1, 1)));

        assert!(Window::Yearly(None).contains(date(1999, 1, 1)));
    }

    #[test]
    fn path_encodes_device_id() {
        let query = SeriesQuery::new("site 4/ac", Metric::Power, Window::Yearly(None));
        assert_eq!(query.path(), "/power/site%204%2Fac/yearly");
        assert!(query.date().is_none());
    }
}
