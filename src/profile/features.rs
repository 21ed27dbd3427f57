// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Chart visibility flags.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::analytics::Metric;

use super::UserProfile;

/// Which organizations may see which analytics charts.
///
/// A metric without a rule is visible to everyone. A metric with a rule is
/// visible only to members of the listed organizations. Power consumption is
/// always visible; rules for it are ignored.
///
/// # Examples
///
/// ```
/// use iotdash::analytics::Metric;
/// use iotdash::profile::{ChartRules, UserProfile};
///
/// let rules = ChartRules::default()
///     .with_allowlist(Metric::CarbonFootprint, ["org-green"])
///     .with_allowlist(Metric::Savings, ["org-green", "org-audit"]);
///
/// let profile = UserProfile {
///     organization_ids: vec!["org-audit".to_string()],
///     ..UserProfile::default()
/// };
///
/// let flags = rules.resolve(&profile);
/// assert!(flags.is_visible(Metric::Power));
/// assert!(!flags.is_visible(Metric::CarbonFootprint));
/// assert!(flags.is_visible(Metric::WorkingHours));
/// assert!(flags.is_visible(Metric::Savings));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartRules {
    allowlists: HashMap<Metric, BTreeSet<String>>,
}

impl ChartRules {
    /// Restricts `metric` to members of `organizations`.
    ///
    /// Calling it again for the same metric extends the list.
    #[must_use]
    pub fn with_allowlist<I, S>(mut self, metric: Metric, organizations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowlists
            .entry(metric)
            .or_default()
            .extend(organizations.into_iter().map(Into::into));
        self
    }

    /// Returns the allowlist of `metric`, if it is restricted.
    #[must_use]
    pub fn allowlist(&self, metric: Metric) -> Option<&BTreeSet<String>> {
        self.allowlists.get(&metric)
    }

    /// Resolves the rules for one user.
    #[must_use]
    pub fn resolve(&self, profile: &UserProfile) -> FeatureFlags {
        let allowed = |metric: Metric| {
            self.allowlists.get(&metric).is_none_or(|orgs| {
                profile
                    .organization_ids
                    .iter()
                    .any(|id| orgs.contains(id))
            })
        };

        FeatureFlags {
            power: true,
            carbon_footprint: allowed(Metric::CarbonFootprint),
            working_hours: allowed(Metric::WorkingHours),
            savings: allowed(Metric::Savings),
        }
    }
}

/// Chart visibility for the signed-in user.
///
/// Resolved once from [`ChartRules`] and the profile, then passed to every
/// screen that draws charts. Read it through [`FeatureFlags::is_visible`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
// One flag per chart; they are independent and do not form a state machine.
#[allow(clippy::struct_excessive_bools)]
pub struct FeatureFlags {
    /// Power consumption chart.
    power: bool,
    /// Carbon footprint chart.
    carbon_footprint: bool,
    /// Working hours chart.
    working_hours: bool,
    /// Savings chart.
    savings: bool,
}

impl FeatureFlags {
    /// Every chart visible.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            power: true,
            carbon_footprint: true,
            working_hours: true,
            savings: true,
        }
    }

    /// Returns `true` if the chart of `metric` may be shown.
    #[must_use]
    pub const fn is_visible(&self, metric: Metric) -> bool {
        match metric {
            Metric::Power => self.power,
            Metric::CarbonFootprint => self.carbon_footprint,
            Metric::WorkingHours => self.working_hours,
            Metric::Savings => self.savings,
        }
    }

    /// Returns the visible metrics in display order.
    #[must_use]
    pub fn visible_metrics(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| self.is_visible(*m))
            .collect()
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member_of(orgs: &[&str]) -> UserProfile {
        UserProfile {
            organization_ids: orgs.iter().map(ToString::to_string).collect(),
            ..UserProfile::default()
        }
    }

    #[test]
    fn no_rules_show_everything() {
        let flags = ChartRules::default().resolve(&member_of(&[]));
        assert_eq!(flags, FeatureFlags::all());
    }

    #[test]
    fn power_ignores_rules() {
        let rules = ChartRules::default().with_allowlist(Metric::Power, ["org-x"]);
        assert!(rules.resolve(&member_of(&["org-y"])).is_visible(Metric::Power));
    }

    #[test]
    fn user_without_orgs_loses_restricted_charts() {
        let rules = ChartRules::default().with_allowlist(Metric::WorkingHours, ["org-x"]);
        let flags = rules.resolve(&member_of(&[]));

        assert_eq!(
            flags.visible_metrics(),
            [Metric::Power, Metric::CarbonFootprint, Metric::Savings]
        );
    }

    #[test]
    fn allowlists_extend() {
        let rules = ChartRules::default()
            .with_allowlist(Metric::Savings, ["a"])
            .with_allowlist(Metric::Savings, ["b"]);

        assert_eq!(rules.allowlist(Metric::Savings).unwrap().len(), 2);
        assert!(rules.resolve(&member_of(&["b"])).is_visible(Metric::Savings));
    }

    #[test]
    fn rules_load_from_json() {
        let rules: ChartRules =
            serde_json::from_str(r#"{"carbon-footprint": ["org-green"]}"#).unwrap();
        assert!(!rules.resolve(&member_of(&["org-red"])).is_visible(Metric::CarbonFootprint));
        assert!(rules.resolve(&member_of(&["org-green"])).is_visible(Metric::CarbonFootprint));
    }

    #[test]
    fn resolved_flags_do_not_follow_later_rules() {
        let rules = ChartRules::default();
        let flags = rules.resolve(&member_of(&["org-red"]));

        let rules = rules.with_allowlist(Metric::Savings, ["org-green"]);
        assert!(flags.is_visible(Metric::Savings));
        assert!(!rules.resolve(&member_of(&["org-red"])).is_visible(Metric::Savings));

        let json = serde_json::to_value(flags).unwrap();
        assert_eq!(json["savings"], true);
    }
}
