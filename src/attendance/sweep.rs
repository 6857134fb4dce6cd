//! Warning sweeps: scheduled batch scans that flag employees whose day is
//! still open (last event is IN) and, at end of day, synthesize the missing
//! check-out.
//!
//! Each sweep kind is idempotent per (employee, day): a `sweep_markers` row is
//! claimed before mutating, so a rerun of the same kind is a no-op while a
//! later kind may still overwrite an earlier kind's reason.

use std::collections::BTreeMap;
use std::time::Duration as StdDuration;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::MySqlPool;
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::attendance::{locks, policy, records};
use crate::model::attendance::{
    AttendanceRecord, EventStatus, EventType, NewAttendanceRecord,
};
use crate::notify::{Notifier, NotifyEvent};

pub const AUTO_DEVICE: &str = "AUTO_SYSTEM";

const REASON_MIDDAY: &str = "No check-out by midday";
const REASON_EVENING: &str = "No check-out by end of shift";
const REASON_PAST_DAY: &str = "Missing check-out (previous day)";
const REASON_AUTO: &str = "Automatic check-out";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SweepKind {
    Midday,
    Evening,
    PastDay,
    AutoCheckout,
}

impl SweepKind {
    pub fn reason(&self) -> &'static str {
        match self {
            SweepKind::Midday => REASON_MIDDAY,
            SweepKind::Evening => REASON_EVENING,
            SweepKind::PastDay => REASON_PAST_DAY,
            SweepKind::AutoCheckout => REASON_AUTO,
        }
    }

    /// PastDay scans yesterday; everything else scans the current day.
    fn target_day(&self, today: NaiveDate) -> NaiveDate {
        match self {
            SweepKind::PastDay => today.pred_opt().unwrap_or(today),
            _ => today,
        }
    }

    /// PastDay only touches rows no earlier sweep already flagged.
    fn skip_flagged(&self) -> bool {
        matches!(self, SweepKind::PastDay)
    }
}

/// Group a day's rows (ordered employee, ts) into per-employee sequences.
pub fn group_by_employee(rows: Vec<AttendanceRecord>) -> BTreeMap<u64, Vec<AttendanceRecord>> {
    let mut by_employee: BTreeMap<u64, Vec<AttendanceRecord>> = BTreeMap::new();
    for row in rows {
        by_employee.entry(row.employee_id).or_default().push(row);
    }
    by_employee
}

/// The open IN per employee, if any: the day's last event when it is an IN.
pub fn open_in_targets(
    by_employee: &BTreeMap<u64, Vec<AttendanceRecord>>,
    skip_flagged: bool,
) -> Vec<AttendanceRecord> {
    by_employee
        .values()
        .filter(|day| policy::has_open_in(day))
        .filter_map(|day| day.last())
        .filter(|last| !(skip_flagged && last.has_warning))
        .cloned()
        .collect()
}

/// Run one sweep over its target day. Returns how many employees were
/// actually flagged or auto-checked-out; marker-skipped employees do not
/// count. Per-employee failures are logged and do not stop the scan.
pub async fn run_sweep(
    pool: &MySqlPool,
    notifier: &dyn Notifier,
    kind: SweepKind,
) -> anyhow::Result<u64> {
    let run_id = Uuid::new_v4();
    let day = kind.target_day(Local::now().date_naive());

    let rows = records::day_records_all(pool, day).await?;
    let by_employee = group_by_employee(rows);
    let targets = open_in_targets(&by_employee, kind.skip_flagged());

    tracing::info!(%run_id, kind = %kind, %day, candidates = targets.len(), "sweep started");

    let mut processed = 0u64;
    for target in &targets {
        match apply_to_employee(pool, notifier, kind, day, target).await {
            Ok(true) => processed += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    %run_id,
                    employee_id = target.employee_id,
                    kind = %kind,
                    "sweep step failed, continuing"
                );
            }
        }
    }

    tracing::info!(%run_id, kind = %kind, processed, "sweep finished");
    Ok(processed)
}

async fn apply_to_employee(
    pool: &MySqlPool,
    notifier: &dyn Notifier,
    kind: SweepKind,
    day: NaiveDate,
    open_in: &AttendanceRecord,
) -> anyhow::Result<bool> {
    let _guard = locks::lock_employee(open_in.employee_id).await;

    if !records::try_mark_sweep(pool, open_in.employee_id, day, kind.as_ref()).await? {
        return Ok(false);
    }

    let now = Local::now().naive_local();

    match kind {
        SweepKind::Midday | SweepKind::Evening | SweepKind::PastDay => {
            records::flag_warning(pool, open_in.id, kind.reason(), now).await?;
        }
        SweepKind::AutoCheckout => {
            // Coordinates are copied from the open IN so the synthetic OUT
            // lands at the site the employee last reported.
            let synthetic = NewAttendanceRecord {
                employee_id: open_in.employee_id,
                ts: now,
                event_type: EventType::Out,
                status: EventStatus::Normal,
                latitude: open_in.latitude,
                longitude: open_in.longitude,
                address: open_in.address.clone(),
                accuracy: None,
                device: Some(AUTO_DEVICE.to_string()),
                notes: None,
                has_warning: true,
                warning_reason: Some(REASON_AUTO.to_string()),
                warning_at: Some(now),
            };
            records::insert_record(pool, &synthetic).await?;
        }
    }

    notifier.notify(&NotifyEvent {
        employee_id: open_in.employee_id,
        kind: kind.to_string(),
        message: kind.reason().to_string(),
        ts: now,
    });

    Ok(true)
}

/// Sleep span until the next local occurrence of `fire_at`.
pub fn until_next_fire(now: NaiveDateTime, fire_at: NaiveTime) -> StdDuration {
    let today_fire = now.date().and_time(fire_at);
    let next = if now < today_fire {
        today_fire
    } else {
        today_fire + Duration::days(1)
    };

    (next - now)
        .to_std()
        .unwrap_or_else(|_| StdDuration::from_secs(60))
}

async fn run_scheduled(
    pool: MySqlPool,
    notifier: std::sync::Arc<dyn Notifier>,
    kind: SweepKind,
    fire_at: NaiveTime,
) {
    tracing::info!(kind = %kind, %fire_at, "sweep scheduler started");

    loop {
        let wait = until_next_fire(Local::now().naive_local(), fire_at);
        tokio::time::sleep(wait).await;

        match run_sweep(&pool, &*notifier, kind).await {
            Ok(processed) => {
                tracing::info!(kind = %kind, processed, "scheduled sweep completed")
            }
            Err(e) => {
                // No retry: a failed run waits for the next day's fire.
                tracing::error!(error = %e, kind = %kind, "scheduled sweep failed")
            }
        }
    }
}

/// Spawn one scheduler loop per sweep kind.
pub fn spawn_sweep_schedulers(
    pool: MySqlPool,
    notifier: std::sync::Arc<dyn Notifier>,
    schedule: [(SweepKind, NaiveTime); 4],
) {
    for (kind, fire_at) in schedule {
        let pool = pool.clone();
        let notifier = notifier.clone();
        actix_web::rt::spawn(run_scheduled(pool, notifier, kind, fire_at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(
        id: u64,
        employee_id: u64,
        hms: &str,
        event_type: EventType,
        has_warning: bool,
    ) -> AttendanceRecord {
        AttendanceRecord {
            id,
            employee_id,
            ts: NaiveDate::from_ymd_opt(2026, 1, 5)
                .unwrap()
                .and_time(NaiveTime::parse_from_str(hms, "%H:%M:%S").unwrap()),
            event_type,
            status: EventStatus::Normal,
            latitude: 23.78,
            longitude: 90.40,
            address: None,
            accuracy: None,
            device: None,
            notes: None,
            has_warning,
            warning_reason: None,
            warning_at: None,
            is_deleted: false,
            deleted_at: None,
        }
    }

    #[test]
    fn sweep_kind_round_trips_through_path_segment() {
        use std::str::FromStr;
        assert_eq!(SweepKind::from_str("midday").unwrap(), SweepKind::Midday);
        assert_eq!(SweepKind::from_str("past_day").unwrap(), SweepKind::PastDay);
        assert_eq!(
            SweepKind::from_str("auto_checkout").unwrap(),
            SweepKind::AutoCheckout
        );
        assert!(SweepKind::from_str("nightly").is_err());
        assert_eq!(SweepKind::Evening.as_ref(), "evening");
    }

    #[test]
    fn past_day_targets_yesterday() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(
            SweepKind::PastDay.target_day(today),
            NaiveDate::from_ymd_opt(2026, 1, 4).unwrap()
        );
        assert_eq!(SweepKind::Midday.target_day(today), today);
    }

    #[test]
    fn open_targets_pick_last_in_per_employee() {
        let rows = vec![
            // employee 1: closed day
            rec(1, 1, "08:30:00", EventType::In, false),
            rec(2, 1, "18:00:00", EventType::Out, false),
            // employee 2: open after a full cycle
            rec(3, 2, "08:30:00", EventType::In, false),
            rec(4, 2, "12:00:00", EventType::Out, false),
            rec(5, 2, "13:00:00", EventType::In, false),
            // employee 3: plain open IN
            rec(6, 3, "09:10:00", EventType::In, false),
        ];

        let by_employee = group_by_employee(rows);
        let targets = open_in_targets(&by_employee, false);
        let ids: Vec<u64> = targets.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 6]);
    }

    #[test]
    fn skip_flagged_filters_already_warned_rows() {
        let rows = vec![
            rec(1, 1, "09:10:00", EventType::In, true),
            rec(2, 2, "09:20:00", EventType::In, false),
        ];

        let by_employee = group_by_employee(rows);

        let all = open_in_targets(&by_employee, false);
        assert_eq!(all.len(), 2);

        let unflagged = open_in_targets(&by_employee, true);
        assert_eq!(unflagged.len(), 1);
        assert_eq!(unflagged[0].employee_id, 2);
    }

    #[test]
    fn reasons_are_distinct_per_kind() {
        let reasons = [
            SweepKind::Midday.reason(),
            SweepKind::Evening.reason(),
            SweepKind::PastDay.reason(),
            SweepKind::AutoCheckout.reason(),
        ];
        for (i, a) in reasons.iter().enumerate() {
            for b in reasons.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn until_next_fire_handles_both_sides_of_midnight() {
        let fire = NaiveTime::from_hms_opt(12, 30, 0).unwrap();

        let before = NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(until_next_fire(before, fire), StdDuration::from_secs(2 * 3600));

        let after = NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        // Exactly at fire time: next fire is tomorrow.
        assert_eq!(
            until_next_fire(after, fire),
            StdDuration::from_secs(24 * 3600)
        );
    }
}
