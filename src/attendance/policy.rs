//! Pure decision logic for check events: event-type toggling, late/early/
//! overtime classification and the per-day state derived from prior records.
//!
//! Everything here operates on rows the caller already fetched; nothing in
//! this module touches the database.

use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, EventStatus, EventType};

/// Canonical shift thresholds shared by every entry point (manual and
/// biometric). Arriving strictly after `late_after` makes the first check-in
/// of the day late; leaving strictly before `early_before` is early, strictly
/// after is overtime, exactly at the boundary is normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftPolicy {
    pub late_after: NaiveTime,
    pub early_before: NaiveTime,
}

/// Where an employee's day currently stands, derived from the ordered list of
/// today's events. Resets to `NoRecord` at local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DayState {
    NoRecord,
    CheckedIn,
    CheckedOut,
}

/// Last event of the day decides the state; the sequence alternates so no
/// further inspection is needed.
pub fn day_state(today: &[AttendanceRecord]) -> DayState {
    match today.last().map(|r| r.event_type) {
        None => DayState::NoRecord,
        Some(EventType::In) => DayState::CheckedIn,
        Some(EventType::Out) => DayState::CheckedOut,
    }
}

/// An "open IN" is a day whose last event is IN. This pairs each IN with the
/// events that actually follow it, so an IN -> OUT -> IN day reads as open.
pub fn has_open_in(today: &[AttendanceRecord]) -> bool {
    day_state(today) == DayState::CheckedIn
}

/// Decide `(type, status)` for a new event at `now` given today's prior
/// records, ordered by timestamp ascending.
pub fn classify(
    policy: &ShiftPolicy,
    now: NaiveDateTime,
    today: &[AttendanceRecord],
) -> (EventType, EventStatus) {
    match today.last().map(|r| r.event_type) {
        None => {
            let status = if now.time() > policy.late_after {
                EventStatus::Late
            } else {
                EventStatus::Normal
            };
            (EventType::In, status)
        }
        Some(EventType::In) => {
            let t = now.time();
            let status = if t < policy.early_before {
                EventStatus::Early
            } else if t > policy.early_before {
                EventStatus::Overtime
            } else {
                EventStatus::Normal
            };
            (EventType::Out, status)
        }
        // A repeat check-in later in the day is never late.
        Some(EventType::Out) => (EventType::In, EventStatus::Normal),
    }
}

/// Hours worked over completed IN -> OUT pairs. A trailing open IN
/// contributes nothing until it is closed.
pub fn paired_work_hours(today: &[AttendanceRecord]) -> f64 {
    let mut open_in: Option<NaiveDateTime> = None;
    let mut minutes = 0i64;

    for rec in today {
        match rec.event_type {
            EventType::In => {
                if open_in.is_none() {
                    open_in = Some(rec.ts);
                }
            }
            EventType::Out => {
                if let Some(start) = open_in.take() {
                    minutes += (rec.ts - start).num_minutes().max(0);
                }
            }
        }
    }

    (minutes as f64 / 60.0 * 100.0).round() / 100.0
}

/// Ids of IN records that carry LATE but are not the first IN of the day.
/// `day_records` must be a single employee's single day, ordered by timestamp.
pub fn misplaced_late_ids(day_records: &[AttendanceRecord]) -> Vec<u64> {
    let mut first_in_seen = false;
    let mut out = Vec::new();

    for rec in day_records {
        if rec.event_type != EventType::In {
            continue;
        }
        if !first_in_seen {
            first_in_seen = true;
            continue;
        }
        if rec.status == EventStatus::Late {
            out.push(rec.id);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn policy() -> ShiftPolicy {
        ShiftPolicy {
            late_after: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            early_before: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        }
    }

    fn at(hms: &str) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 15)
            .unwrap()
            .and_time(NaiveTime::parse_from_str(hms, "%H:%M:%S").unwrap())
    }

    fn rec(id: u64, ts: NaiveDateTime, event_type: EventType, status: EventStatus) -> AttendanceRecord {
        AttendanceRecord {
            id,
            employee_id: 7,
            ts,
            event_type,
            status,
            latitude: 23.78,
            longitude: 90.40,
            address: None,
            accuracy: None,
            device: None,
            notes: None,
            has_warning: false,
            warning_reason: None,
            warning_at: None,
            is_deleted: false,
            deleted_at: None,
        }
    }

    #[test]
    fn first_event_of_day_is_check_in() {
        let (event_type, status) = classify(&policy(), at("08:30:00"), &[]);
        assert_eq!(event_type, EventType::In);
        assert_eq!(status, EventStatus::Normal);
    }

    #[test]
    fn first_check_in_after_threshold_is_late() {
        let (event_type, status) = classify(&policy(), at("09:15:00"), &[]);
        assert_eq!(event_type, EventType::In);
        assert_eq!(status, EventStatus::Late);
    }

    #[test]
    fn check_in_exactly_at_threshold_is_normal() {
        let (_, status) = classify(&policy(), at("09:00:00"), &[]);
        assert_eq!(status, EventStatus::Normal);
    }

    #[test]
    fn events_alternate_in_out_in() {
        let today = vec![rec(1, at("08:30:00"), EventType::In, EventStatus::Normal)];
        let (event_type, _) = classify(&policy(), at("12:00:00"), &today);
        assert_eq!(event_type, EventType::Out);

        let today = vec![
            rec(1, at("08:30:00"), EventType::In, EventStatus::Normal),
            rec(2, at("12:00:00"), EventType::Out, EventStatus::Early),
        ];
        let (event_type, status) = classify(&policy(), at("13:00:00"), &today);
        assert_eq!(event_type, EventType::In);
        assert_eq!(status, EventStatus::Normal);
    }

    #[test]
    fn second_check_in_after_late_threshold_is_still_normal() {
        // Late first IN, out for lunch, back at 14:00: the 14:00 IN must not be LATE.
        let today = vec![
            rec(1, at("09:15:00"), EventType::In, EventStatus::Late),
            rec(2, at("13:00:00"), EventType::Out, EventStatus::Early),
        ];
        let (event_type, status) = classify(&policy(), at("14:00:00"), &today);
        assert_eq!(event_type, EventType::In);
        assert_eq!(status, EventStatus::Normal);
    }

    #[test]
    fn check_out_before_boundary_is_early() {
        let today = vec![rec(1, at("08:30:00"), EventType::In, EventStatus::Normal)];
        let (event_type, status) = classify(&policy(), at("17:30:00"), &today);
        assert_eq!(event_type, EventType::Out);
        assert_eq!(status, EventStatus::Early);
    }

    #[test]
    fn check_out_after_boundary_is_overtime() {
        let today = vec![rec(1, at("08:30:00"), EventType::In, EventStatus::Normal)];
        let (_, status) = classify(&policy(), at("19:05:00"), &today);
        assert_eq!(status, EventStatus::Overtime);
    }

    #[test]
    fn check_out_exactly_at_boundary_is_normal() {
        let today = vec![rec(1, at("08:30:00"), EventType::In, EventStatus::Normal)];
        let (_, status) = classify(&policy(), at("18:00:00"), &today);
        assert_eq!(status, EventStatus::Normal);
    }

    #[test]
    fn day_state_follows_last_event() {
        assert_eq!(day_state(&[]), DayState::NoRecord);

        let one = vec![rec(1, at("08:30:00"), EventType::In, EventStatus::Normal)];
        assert_eq!(day_state(&one), DayState::CheckedIn);

        let two = vec![
            rec(1, at("08:30:00"), EventType::In, EventStatus::Normal),
            rec(2, at("18:00:00"), EventType::Out, EventStatus::Normal),
        ];
        assert_eq!(day_state(&two), DayState::CheckedOut);
    }

    #[test]
    fn open_in_detected_after_full_cycle() {
        // IN -> OUT -> IN: an OUT exists today, but the day is still open.
        let today = vec![
            rec(1, at("08:30:00"), EventType::In, EventStatus::Normal),
            rec(2, at("12:00:00"), EventType::Out, EventStatus::Early),
            rec(3, at("13:00:00"), EventType::In, EventStatus::Normal),
        ];
        assert!(has_open_in(&today));

        let closed = vec![
            rec(1, at("08:30:00"), EventType::In, EventStatus::Normal),
            rec(2, at("18:00:00"), EventType::Out, EventStatus::Normal),
        ];
        assert!(!has_open_in(&closed));
    }

    #[test]
    fn work_hours_sum_completed_pairs_only() {
        let today = vec![
            rec(1, at("09:00:00"), EventType::In, EventStatus::Normal),
            rec(2, at("12:00:00"), EventType::Out, EventStatus::Early),
            rec(3, at("13:00:00"), EventType::In, EventStatus::Normal),
            rec(4, at("17:30:00"), EventType::Out, EventStatus::Early),
        ];
        assert_eq!(paired_work_hours(&today), 7.5);

        // Trailing open IN is ignored.
        let open = vec![
            rec(1, at("09:00:00"), EventType::In, EventStatus::Normal),
            rec(2, at("12:00:00"), EventType::Out, EventStatus::Early),
            rec(3, at("13:00:00"), EventType::In, EventStatus::Normal),
        ];
        assert_eq!(paired_work_hours(&open), 3.0);
        assert_eq!(paired_work_hours(&[]), 0.0);
    }

    #[test]
    fn misplaced_late_keeps_only_first_in() {
        let day = vec![
            rec(1, at("09:15:00"), EventType::In, EventStatus::Late),
            rec(2, at("12:00:00"), EventType::Out, EventStatus::Early),
            rec(3, at("14:00:00"), EventType::In, EventStatus::Late),
            rec(4, at("15:00:00"), EventType::Out, EventStatus::Early),
            rec(5, at("15:30:00"), EventType::In, EventStatus::Late),
        ];
        assert_eq!(misplaced_late_ids(&day), vec![3, 5]);
    }

    #[test]
    fn misplaced_late_ignores_clean_days() {
        let day = vec![
            rec(1, at("08:30:00"), EventType::In, EventStatus::Normal),
            rec(2, at("18:00:00"), EventType::Out, EventStatus::Normal),
        ];
        assert!(misplaced_late_ids(&day).is_empty());
        assert!(misplaced_late_ids(&[]).is_empty());
    }
}
