use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Direction of a single attendance event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString,
    AsRefStr, ToSchema,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventType {
    In,
    Out,
}

/// Status attached to an event at write time; `Warning` is only ever set
/// afterwards by a sweep.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString,
    AsRefStr, ToSchema,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventStatus {
    Normal,
    Late,
    Early,
    Overtime,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 1000,
        "ts": "2026-01-05T08:47:12",
        "event_type": "in",
        "status": "normal",
        "latitude": 23.7808,
        "longitude": 90.4074,
        "address": "Head office",
        "accuracy": 12.5,
        "device": "android-app",
        "notes": null,
        "has_warning": false,
        "warning_reason": null,
        "warning_at": null
    })
)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = "2026-01-05T08:47:12", format = "date-time", value_type = String)]
    pub ts: NaiveDateTime,

    pub event_type: EventType,

    pub status: EventStatus,

    #[schema(example = 23.7808)]
    pub latitude: f64,

    #[schema(example = 90.4074)]
    pub longitude: f64,

    #[schema(example = "Head office", nullable = true)]
    pub address: Option<String>,

    /// GPS accuracy in meters as reported by the device.
    #[schema(example = 12.5, nullable = true)]
    pub accuracy: Option<f64>,

    #[schema(example = "android-app", nullable = true)]
    pub device: Option<String>,

    #[schema(nullable = true)]
    pub notes: Option<String>,

    pub has_warning: bool,

    #[schema(nullable = true)]
    pub warning_reason: Option<String>,

    #[schema(format = "date-time", value_type = String, nullable = true)]
    pub warning_at: Option<NaiveDateTime>,

    #[serde(skip)]
    pub is_deleted: bool,

    #[serde(skip)]
    pub deleted_at: Option<NaiveDateTime>,
}

impl AttendanceRecord {
    pub fn is_in(&self) -> bool {
        self.event_type == EventType::In
    }

    /// Local calendar day the event belongs to.
    pub fn day(&self) -> NaiveDate {
        self.ts.date()
    }
}

/// Insert payload for a new event row. `is_deleted` starts false and the id is
/// assigned by the database.
#[derive(Debug, Clone)]
pub struct NewAttendanceRecord {
    pub employee_id: u64,
    pub ts: NaiveDateTime,
    pub event_type: EventType,
    pub status: EventStatus,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub accuracy: Option<f64>,
    pub device: Option<String>,
    pub notes: Option<String>,
    pub has_warning: bool,
    pub warning_reason: Option<String>,
    pub warning_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_enums_serde_lowercase() {
        let t: EventType = serde_json::from_str("\"out\"").unwrap();
        assert!(matches!(t, EventType::Out));

        let s: EventStatus = serde_json::from_str("\"overtime\"").unwrap();
        assert!(matches!(s, EventStatus::Overtime));

        assert_eq!(serde_json::to_value(EventType::In).unwrap(), serde_json::json!("in"));
        assert_eq!(
            serde_json::to_value(EventStatus::Warning).unwrap(),
            serde_json::json!("warning")
        );
    }

    #[test]
    fn event_enums_display_matches_storage() {
        assert_eq!(EventType::In.to_string(), "in");
        assert_eq!(EventType::Out.to_string(), "out");
        assert_eq!(EventStatus::Late.to_string(), "late");
        assert_eq!(EventStatus::Early.as_ref(), "early");
    }

    #[test]
    fn record_day_is_date_part_of_ts() {
        let ts = NaiveDateTime::parse_from_str("2026-01-05 23:59:59", "%Y-%m-%d %H:%M:%S").unwrap();
        let rec = AttendanceRecord {
            id: 1,
            employee_id: 7,
            ts,
            event_type: EventType::In,
            status: EventStatus::Normal,
            latitude: 0.0,
            longitude: 0.0,
            address: None,
            accuracy: None,
            device: None,
            notes: None,
            has_warning: false,
            warning_reason: None,
            warning_at: None,
            is_deleted: false,
            deleted_at: None,
        };
        assert!(rec.is_in());
        assert_eq!(rec.day(), NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
    }
}
