//! Travel time and delay estimation over a set of candidate speeds.
//!
//! `time_minutes = round((length_m / (kmh * 1000 / 3600)) / 60, 2)` and a
//! delay is `degraded_time - baseline_time`, rounded the same way. Delays
//! are not clamped: a "degraded" speed above the baseline gives a negative
//! delay.

use serde::{Deserialize, Serialize};

use crate::{Error, Minutes};

/// A named candidate traversal speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speed {
    pub label: String,
    pub kmh: f64,
}

impl Speed {
    pub fn new(label: impl Into<String>, kmh: f64) -> Self {
        Self {
            label: label.into(),
            kmh,
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if self.kmh.is_finite() && self.kmh > 0.0 {
            Ok(())
        } else {
            Err(Error::InvalidSpeed {
                label: self.label.clone(),
                kmh: self.kmh,
            })
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawSpeedProfile {
    baseline: String,
    speeds: Vec<Speed>,
}

/// Ordered speeds with one designated baseline (free-flow) speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSpeedProfile")]
pub struct SpeedProfile {
    baseline: String,
    speeds: Vec<Speed>,
}

impl SpeedProfile {
    /// # Errors
    ///
    /// `InvalidSpeed` for a non-positive or non-finite speed, `InvalidData`
    /// for an empty table, repeated labels or an unknown baseline.
    pub fn new(speeds: Vec<Speed>, baseline: &str) -> Result<Self, Error> {
        if speeds.is_empty() {
            return Err(Error::InvalidData("Speed profile is empty".to_string()));
        }
        for (i, speed) in speeds.iter().enumerate() {
            speed.validate()?;
            if speeds[..i].iter().any(|other| other.label == speed.label) {
                return Err(Error::InvalidData(format!(
                    "Speed label '{}' is repeated",
                    speed.label
                )));
            }
        }
        if !speeds.iter().any(|speed| speed.label == baseline) {
            return Err(Error::InvalidData(format!(
                "Baseline speed '{baseline}' is not in the profile"
            )));
        }

        Ok(Self {
            baseline: baseline.to_string(),
            speeds,
        })
    }

    /// 50 km/h free flow against 20 km/h through a flooded road
    pub fn flood_default() -> Self {
        Self {
            baseline: "50".to_string(),
            speeds: vec![Speed::new("50", 50.0), Speed::new("20", 20.0)],
        }
    }

    /// Bus speeds: 60 km/h normal service against flooded 48, 30, 12 and 5 km/h
    pub fn bus_flood() -> Self {
        Self {
            baseline: "60".to_string(),
            speeds: vec![
                Speed::new("60", 60.0),
                Speed::new("48", 48.0),
                Speed::new("30", 30.0),
                Speed::new("12", 12.0),
                Speed::new("5", 5.0),
            ],
        }
    }

    pub fn baseline(&self) -> &str {
        &self.baseline
    }

    pub fn speeds(&self) -> &[Speed] {
        &self.speeds
    }

    /// All speeds other than the baseline, in profile order
    pub fn degraded(&self) -> impl Iterator<Item = &Speed> {
        self.speeds
            .iter()
            .filter(move |speed| speed.label != self.baseline)
    }
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self::flood_default()
    }
}

impl TryFrom<RawSpeedProfile> for SpeedProfile {
    type Error = Error;

    fn try_from(raw: RawSpeedProfile) -> Result<Self, Self::Error> {
        SpeedProfile::new(raw.speeds, &raw.baseline)
    }
}

/// Minutes per speed label, in profile order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeedTable(Vec<(String, Minutes)>);

/// Travel time per speed label
pub type TravelTimes = SpeedTable;
/// Delay against the baseline per degraded speed label
pub type Delays = SpeedTable;

impl SpeedTable {
    pub fn get(&self, label: &str) -> Option<Minutes> {
        self.0
            .iter()
            .find(|(other, _)| other == label)
            .map(|(_, minutes)| *minutes)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Minutes)> {
        self.0.iter().map(|(label, minutes)| (label.as_str(), *minutes))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn round_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Minutes needed to cover `length_m` at `kmh`, rounded to two decimals
pub fn travel_time_minutes(length_m: f64, kmh: f64) -> Result<Minutes, Error> {
    if !kmh.is_finite() || kmh <= 0.0 {
        return Err(Error::InvalidSpeed {
            label: kmh.to_string(),
            kmh,
        });
    }
    let meters_per_second = kmh * 1000.0 / 3600.0;
    Ok(round_2(length_m / meters_per_second / 60.0))
}

/// Travel time for every speed of the profile.
///
/// # Errors
///
/// `InvalidData` for a negative or non-finite length, `InvalidSpeed` for a
/// non-positive speed.
pub fn estimate(length_m: f64, speeds: &SpeedProfile) -> Result<TravelTimes, Error> {
    if !length_m.is_finite() || length_m < 0.0 {
        return Err(Error::InvalidData(format!("Invalid edge length {length_m}")));
    }

    speeds
        .speeds()
        .iter()
        .map(|speed| {
            speed.validate()?;
            Ok((speed.label.clone(), travel_time_minutes(length_m, speed.kmh)?))
        })
        .collect::<Result<Vec<_>, Error>>()
        .map(SpeedTable)
}

/// Delay of every non-baseline time against the baseline time
pub fn delay(times: &TravelTimes, baseline_label: &str) -> Result<Delays, Error> {
    let baseline = times.get(baseline_label).ok_or_else(|| {
        Error::InvalidData(format!("No travel time for baseline '{baseline_label}'"))
    })?;

    Ok(SpeedTable(
        times
            .iter()
            .filter(|(label, _)| *label != baseline_label)
            .map(|(label, minutes)| (label.to_string(), round_2(minutes - baseline)))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_values() {
        let profile = SpeedProfile::flood_default();
        let times = estimate(616.49, &profile).unwrap();
        assert_eq!(times.get("50"), Some(0.74));
        assert_eq!(times.get("20"), Some(1.85));

        let delays = delay(&times, profile.baseline()).unwrap();
        assert_eq!(delays.len(), 1);
        assert_eq!(delays.get("20"), Some(1.11));
        assert_eq!(delays.get("50"), None);
    }

    #[test]
    fn time_is_positive_and_decreasing_in_speed() {
        let lengths = [1.0, 57.3, 616.49, 2500.0, 18_000.0];
        let speeds = [5.0, 12.0, 20.0, 30.0, 48.0, 50.0, 80.0];
        for length in lengths {
            let times: Vec<f64> = speeds
                .iter()
                .map(|&kmh| travel_time_minutes(length, kmh).unwrap())
                .collect();
            assert!(times[0] > 0.0, "{length} m at 5 km/h");
            assert!(times.windows(2).all(|w| w[0] >= w[1]), "{times:?}");
        }
    }

    #[test]
    fn faster_degraded_speed_gives_negative_delay() {
        let profile =
            SpeedProfile::new(vec![Speed::new("20", 20.0), Speed::new("50", 50.0)], "20").unwrap();
        let times = estimate(616.49, &profile).unwrap();
        let delays = delay(&times, "20").unwrap();
        assert_eq!(delays.get("50"), Some(-1.11));
    }

    #[test]
    fn zero_and_negative_speeds_are_configuration_errors() {
        for kmh in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let result = SpeedProfile::new(vec![Speed::new("50", 50.0), Speed::new("x", kmh)], "50");
            assert!(matches!(result, Err(Error::InvalidSpeed { .. })), "{kmh}");
            assert!(matches!(
                travel_time_minutes(100.0, kmh),
                Err(Error::InvalidSpeed { .. })
            ));
        }
    }

    #[test]
    fn profile_validation() {
        assert!(SpeedProfile::new(vec![], "50").is_err());
        assert!(SpeedProfile::new(vec![Speed::new("50", 50.0)], "20").is_err());
        assert!(
            SpeedProfile::new(vec![Speed::new("50", 50.0), Speed::new("50", 40.0)], "50").is_err()
        );
    }

    #[test]
    fn invalid_lengths_are_rejected() {
        let profile = SpeedProfile::flood_default();
        assert!(estimate(-1.0, &profile).is_err());
        assert!(estimate(f64::NAN, &profile).is_err());
        let zero = estimate(0.0, &profile).unwrap();
        assert_eq!(zero.get("20"), Some(0.0));
    }

    #[test]
    fn bus_profile_delays_every_flooded_speed() {
        let profile = SpeedProfile::bus_flood();
        let times = estimate(1200.0, &profile).unwrap();
        let delays = delay(&times, profile.baseline()).unwrap();
        let labels: Vec<_> = delays.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, ["48", "30", "12", "5"]);
        // 1200 m: 1.2 min at 60 km/h, 1.5 at 48, 14.4 at 5
        assert_eq!(delays.get("48"), Some(0.3));
        assert_eq!(delays.get("5"), Some(13.2));
        assert_eq!(delays.get("60"), None);
    }

    #[test]
    fn profile_deserializes_with_validation() {
        let profile: SpeedProfile = serde_json::from_str(
            r#"{"baseline": "50", "speeds": [{"label": "50", "kmh": 50}, {"label": "20", "kmh": 20}]}"#,
        )
        .unwrap();
        assert_eq!(profile, SpeedProfile::flood_default());

        let invalid = serde_json::from_str::<SpeedProfile>(
            r#"{"baseline": "50", "speeds": [{"label": "50", "kmh": 0}]}"#,
        );
        assert!(invalid.is_err());
    }
}
