//! Records returned by the climate observation API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A fixed weather station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Station code, e.g. `USC00519397`. Referenced by measurements.
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

/// One temperature reading from one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureObservation {
    /// Observation date (`YYYY-MM-DD`).
    pub date: String,
    pub tobs: f64,
}

/// Precipitation by date, ascending. Missing readings are `None`.
pub type PrecipitationSeries = BTreeMap<String, Option<f64>>;

/// Min/max/avg temperature over a set of measurements.
///
/// All fields are `None` when no measurement matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSummary {
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub avg_temp: Option<f64>,
}

impl TemperatureSummary {
    pub fn is_empty(&self) -> bool {
        self.min_temp.is_none() && self.max_temp.is_none() && self.avg_temp.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary_serializes_nulls() {
        let summary = TemperatureSummary::default();
        assert!(summary.is_empty());

        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "min_temp": null, "max_temp": null, "avg_temp": null })
        );
    }

    #[test]
    fn test_precipitation_keys_sorted() {
        let mut series = PrecipitationSeries::new();
        series.insert("2017-08-23".to_string(), Some(0.45));
        series.insert("2016-08-24".to_string(), None);

        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"{"2016-08-24":null,"2017-08-23":0.45}"#);
    }
}
