//!Wire messages exchanged with observers.

use pacer_core::reading::Reading;
use serde::{Deserialize, Serialize};

///Control signal an observer may send as a JSON text frame.
#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum WsControl {
    Start,
    Stop,
}

///Envelope for one reading pushed to an observer per tick.
#[derive(Serialize, Debug)]
pub(crate) struct WsEvent {
    event: &'static str,
    data: Reading,
}

impl WsEvent {
    pub fn pacemaker_data(reading: Reading) -> Self {
        WsEvent {
            event: "pacemakerData",
            data: reading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacer_core::reading::{Anomalies, GeoLocation, PacingMode};

    fn reading() -> Reading {
        Reading {
            device_id: "PACEMAKER-42".to_string(),
            timestamp: "2026-08-23T12:00:00.000Z".to_string(),
            heart_rate: 72,
            battery_status: "88.5".to_string(),
            pacing_mode: PacingMode::Ddd,
            pacing_rate: 75,
            anomalies: Anomalies {
                arrhythmia_detected: false,
                high_heart_rate: false,
                low_heart_rate: false,
            },
            geo_location: GeoLocation {
                latitude: "51.507351".to_string(),
                longitude: "-0.127758".to_string(),
            },
        }
    }

    #[test]
    fn parses_control_signals() {
        assert_eq!(
            serde_json::from_str::<WsControl>("\"start\"").unwrap(),
            WsControl::Start
        );
        assert_eq!(
            serde_json::from_str::<WsControl>("\"stop\"").unwrap(),
            WsControl::Stop
        );
    }

    #[test]
    fn rejects_unknown_control_signals() {
        assert!(serde_json::from_str::<WsControl>("\"pause\"").is_err());
        assert!(serde_json::from_str::<WsControl>("start").is_err());
    }

    #[test]
    fn event_envelope_matches_wire_shape() {
        let event = WsEvent::pacemaker_data(reading());
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "pacemakerData");
        assert_eq!(json["data"]["deviceId"], "PACEMAKER-42");
        assert_eq!(json["data"]["heartRate"], 72);
        assert_eq!(json["data"]["pacingMode"], "DDD");
        assert_eq!(json["data"]["anomalies"]["lowHeartRate"], false);
        assert_eq!(json["data"]["geoLocation"]["latitude"], "51.507351");
    }
}
