// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Chart summary figures.

use serde::Serialize;

use super::{ReportedSummary, Series};

/// Largest value of a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Peak {
    /// Label of the bucket holding the value. `None` when a reported peak
    /// matches no bucket.
    pub label: Option<String>,
    /// Its value.
    pub value: f64,
}

/// Savings against a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Savings {
    /// Baseline total minus actual total. Negative when over baseline.
    pub amount: f64,
    /// `amount` as a percentage of the baseline, if the baseline is positive.
    pub percent: Option<f64>,
}

/// Figures shown next to a chart.
///
/// Totals reported by the backend take precedence; anything missing is
/// computed from the buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Sum over the window.
    pub total: f64,
    /// Mean per bucket.
    pub average: f64,
    /// Largest bucket, if the series has any non-zero value.
    pub peak: Option<Peak>,
    /// Baseline total, if known.
    pub baseline: Option<f64>,
    /// Savings, if a baseline is known.
    pub savings: Option<Savings>,
}

impl Summary {
    /// Builds the summary of `series`, preferring `reported` figures.
    #[must_use]
    pub fn compute(series: &Series, reported: &ReportedSummary) -> Self {
        let computed_total: f64 = series.buckets().iter().map(|b| b.value).sum();
        let total = reported.total.unwrap_or(computed_total);

        let average = reported.average.unwrap_or_else(|| {
            if series.is_empty() {
                0.0
            } else {
                #[allow(clippy::cast_precision_loss)]
                // Safe: bucket counts are at most 31
                let count = series.len() as f64;
                total / count
            }
        });

        let peak = match reported.peak {
            Some(value) => Some(Peak {
                label: series
                    .buckets()
                    .iter()
                    .find(|b| (b.value - value).abs() < f64::EPSILON)
                    .map(|b| b.label.clone()),
                value,
            }),
            None => series
                .buckets()
                .iter()
                .filter(|b| b.value > 0.0)
                .max_by(|a, b| a.value.total_cmp(&b.value))
                .map(|bucket| Peak {
                    label: Some(bucket.label.clone()),
                    value: bucket.value,
                }),
        };

        let bucket_baseline = series
            .buckets()
            .iter()
            .filter_map(|b| b.baseline)
            .reduce(|a, b| a + b);
        let baseline = reported.baseline.or(bucket_baseline);

        let savings = baseline.map(|baseline| {
            let amount = baseline - total;
            Savings {
                amount,
                percent: (baseline > 0.0).then(|| amount / baseline * 100.0),
            }
        });

        Self {
            total,
            average,
            peak,
            baseline,
            savings,
        }
    }
}
