//! Attendance core: the decision engine behind the check endpoints, the
//! warning sweeps and the reports. The HTTP layer resolves employees and
//! locations, then calls into here.

pub mod locks;
pub mod policy;
pub mod records;
pub mod report;
pub mod sweep;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, NewAttendanceRecord};
use self::policy::{DayState, ShiftPolicy};

/// Caller-supplied context for a new check event. The employee must already
/// be known to exist.
#[derive(Debug, Clone)]
pub struct EventInput {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub accuracy: Option<f64>,
    pub device: Option<String>,
    pub notes: Option<String>,
}

/// Record a check event for an employee: read today's records, classify the
/// new event, persist it. The whole sequence holds the employee's lock so
/// concurrent calls cannot both observe the same prior state.
pub async fn record_event(
    pool: &MySqlPool,
    shift: &ShiftPolicy,
    employee_id: u64,
    input: EventInput,
) -> Result<AttendanceRecord, sqlx::Error> {
    let _guard = locks::lock_employee(employee_id).await;

    let now = Local::now().naive_local();
    let today = records::day_records(pool, employee_id, now.date()).await?;
    let (event_type, status) = policy::classify(shift, now, &today);

    let new = NewAttendanceRecord {
        employee_id,
        ts: now,
        event_type,
        status,
        latitude: input.latitude,
        longitude: input.longitude,
        address: input.address,
        accuracy: input.accuracy,
        device: input.device,
        notes: input.notes,
        has_warning: false,
        warning_reason: None,
        warning_at: None,
    };

    let id = records::insert_record(pool, &new).await?;
    records::fetch_record(pool, id).await
}

/// Read-only projection of an employee's current day.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "employee_id": 1000,
    "date": "2026-01-05",
    "check_ins": 2,
    "check_outs": 1,
    "total_work_hours": 3.5,
    "status": "checked_in"
}))]
pub struct TodayStatus {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = 2)]
    pub check_ins: u64,
    #[schema(example = 1)]
    pub check_outs: u64,
    /// Hours over completed IN/OUT pairs; an open IN counts once closed.
    #[schema(example = 3.5)]
    pub total_work_hours: f64,
    #[schema(example = "checked_in")]
    pub status: DayState,
}

pub async fn today_status(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<TodayStatus, sqlx::Error> {
    let date = Local::now().date_naive();
    let today = records::day_records(pool, employee_id, date).await?;

    Ok(TodayStatus {
        employee_id,
        date,
        check_ins: today.iter().filter(|r| r.is_in()).count() as u64,
        check_outs: today.iter().filter(|r| !r.is_in()).count() as u64,
        total_work_hours: policy::paired_work_hours(&today),
        status: policy::day_state(&today),
    })
}
