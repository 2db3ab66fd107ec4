//! ICU data filter configurations.
//!
//! See <https://github.com/unicode-org/icu/blob/main/docs/userguide/icu_data/buildtool.md>
//! for the file format understood by `ICU_DATA_FILTER_FILE`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Resources dropped from the device `.dat` and shipped through the tz module instead.
pub const TIME_ZONE_RESOURCES: [&str; 4] =
    ["metaZones", "timezoneTypes", "windowsZones", "zoneinfo64"];

/// Locales kept for the adaboost (ML) line-break model.
pub const ADABOOST_LOCALES: [&str; 1] = ["jaml"];

/// Top-level filter document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFilters {
    pub feature_filters: BTreeMap<String, FeatureFilter>,
}

/// A single feature filter rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureFilter {
    Includelist(Vec<String>),
    Excludelist(Vec<String>),
}

/// The two named filter sets fed to `runConfigureICU`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterConfiguration {
    /// Everything except the time-zone resources, adaboost restricted to `jaml`.
    WithoutTimeZones,
    /// All resources, adaboost restricted to `jaml`.
    MachineLearning,
}

impl FilterConfiguration {
    pub const ALL: [FilterConfiguration; 2] = [
        FilterConfiguration::WithoutTimeZones,
        FilterConfiguration::MachineLearning,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterConfiguration::WithoutTimeZones => "without-time-zones",
            FilterConfiguration::MachineLearning => "machine-learning",
        }
    }

    pub fn filters(self) -> DataFilters {
        let mut feature_filters = BTreeMap::new();
        if self == FilterConfiguration::WithoutTimeZones {
            feature_filters.insert(
                "misc".to_string(),
                FeatureFilter::Excludelist(owned(&TIME_ZONE_RESOURCES)),
            );
        }
        feature_filters.insert(
            "brkitr_adaboost".to_string(),
            FeatureFilter::Includelist(owned(&ADABOOST_LOCALES)),
        );
        DataFilters { feature_filters }
    }

    /// Render the filter file contents.
    pub fn to_json(self) -> serde_json::Result<String> {
        let mut s = serde_json::to_string_pretty(&self.filters())?;
        s.push('\n');
        Ok(s)
    }
}

impl fmt::Display for FilterConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterConfiguration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterConfiguration::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown filter configuration '{s}'"))
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
