//!The `Reading` data model and its random generation.
//!
//!One `Reading` is produced per emitter tick. Readings are immutable once
//!created and serialize to the wire shape consumed by viewers and the broker
//!topic (camelCase keys, nested `anomalies` and `geoLocation` objects).

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde::Serialize;

///Pacing mode reported by the simulated device.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PacingMode {
    Ddd,
    Aai,
    Vvi,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Anomalies {
    pub arrhythmia_detected: bool,
    pub high_heart_rate: bool,
    pub low_heart_rate: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GeoLocation {
    pub latitude: String,
    pub longitude: String,
}

///One synthetic pacemaker telemetry record.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub device_id: String,
    pub timestamp: String,
    pub heart_rate: u32,
    pub battery_status: String,
    pub pacing_mode: PacingMode,
    pub pacing_rate: u32,
    pub anomalies: Anomalies,
    pub geo_location: GeoLocation,
}

impl Reading {
    ///Generate one random reading for the given tick number.
    ///
    ///`tick` is the process-lifetime generation counter. It must increase
    ///monotonically across start/stop cycles; the `highHeartRate` flag fires
    ///on every 20th tick and on nothing else.
    pub fn generate(tick: u64, rng: &mut impl Rng) -> Reading {
        let heart_rate = rng.gen_range(60..=120);

        Reading {
            device_id: format!("PACEMAKER-{}", rng.gen_range(1..=1000)),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            heart_rate,
            battery_status: format!("{:.1}", rng.gen_range(0.0..=100.0_f64).clamp(0.0, 100.0)),
            pacing_mode: match rng.gen_range(0..3) {
                0 => PacingMode::Ddd,
                1 => PacingMode::Aai,
                _ => PacingMode::Vvi,
            },
            pacing_rate: rng.gen_range(60..=90),
            anomalies: Anomalies {
                arrhythmia_detected: rng.gen_bool(0.05),
                high_heart_rate: tick % 20 == 0,
                low_heart_rate: heart_rate < 70,
            },
            geo_location: GeoLocation {
                latitude: format!("{:.6}", rng.gen_range(-90.0..=90.0_f64)),
                longitude: format!("{:.6}", rng.gen_range(-180.0..=180.0_f64)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn decimals(s: &str) -> usize {
        s.split('.').nth(1).map(|d| d.len()).unwrap_or(0)
    }

    #[test]
    fn generated_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for tick in 1..=500u64 {
            let r = Reading::generate(tick, &mut rng);

            assert!((60..=120).contains(&r.heart_rate), "heart rate {}", r.heart_rate);
            assert!((60..=90).contains(&r.pacing_rate), "pacing rate {}", r.pacing_rate);
            assert!(matches!(
                r.pacing_mode,
                PacingMode::Ddd | PacingMode::Aai | PacingMode::Vvi
            ));

            let battery: f64 = r.battery_status.parse().unwrap();
            assert!((0.0..=100.0).contains(&battery), "battery {}", r.battery_status);
            assert_eq!(decimals(&r.battery_status), 1);

            let lat: f64 = r.geo_location.latitude.parse().unwrap();
            let lon: f64 = r.geo_location.longitude.parse().unwrap();
            assert!((-90.0..=90.0).contains(&lat));
            assert!((-180.0..=180.0).contains(&lon));
            assert_eq!(decimals(&r.geo_location.latitude), 6);
            assert_eq!(decimals(&r.geo_location.longitude), 6);

            let suffix: u32 = r.device_id.strip_prefix("PACEMAKER-").unwrap().parse().unwrap();
            assert!((1..=1000).contains(&suffix));
        }
    }

    #[test]
    fn low_heart_rate_tracks_heart_rate() {
        let mut rng = StdRng::seed_from_u64(21);
        for tick in 1..=500u64 {
            let r = Reading::generate(tick, &mut rng);
            assert_eq!(r.anomalies.low_heart_rate, r.heart_rate < 70);
        }
    }

    #[test]
    fn high_heart_rate_fires_on_every_20th_tick() {
        let mut rng = StdRng::seed_from_u64(3);
        for tick in 1..=100u64 {
            let r = Reading::generate(tick, &mut rng);
            assert_eq!(r.anomalies.high_heart_rate, tick % 20 == 0, "tick {}", tick);
        }
    }

    #[test]
    fn serializes_with_camel_case_wire_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        let reading = Reading::generate(20, &mut rng);
        let json = serde_json::to_value(&reading).unwrap();

        assert!(json.get("deviceId").is_some());
        assert!(json.get("timestamp").is_some());
        assert!(json.get("heartRate").is_some());
        assert!(json.get("batteryStatus").is_some());
        assert!(json.get("pacingRate").is_some());
        assert!(json["anomalies"].get("arrhythmiaDetected").is_some());
        assert_eq!(json["anomalies"]["highHeartRate"], true);
        assert!(json["anomalies"].get("lowHeartRate").is_some());
        assert!(json["geoLocation"].get("latitude").is_some());
        assert!(json["geoLocation"].get("longitude").is_some());

        let mode = json["pacingMode"].as_str().unwrap();
        assert!(["DDD", "AAI", "VVI"].contains(&mode));
    }

    #[test]
    fn timestamp_is_iso8601_utc() {
        let mut rng = StdRng::seed_from_u64(11);
        let reading = Reading::generate(1, &mut rng);
        let parsed = chrono::DateTime::parse_from_rfc3339(&reading.timestamp);
        assert!(parsed.is_ok(), "timestamp {}", reading.timestamp);
        assert!(reading.timestamp.ends_with('Z'));
    }
}
