//! Row-level persistence for attendance events. All reads exclude
//! soft-deleted rows and order by timestamp so the policy layer can rely on
//! the sequence.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::MySqlPool;

use crate::model::attendance::{AttendanceRecord, EventStatus, NewAttendanceRecord};
use crate::utils::date::day_bounds;

/// One employee's events for one local calendar day, oldest first.
pub async fn day_records(
    pool: &MySqlPool,
    employee_id: u64,
    day: NaiveDate,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let (start, end) = day_bounds(day);

    sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT * FROM attendance_records
        WHERE employee_id = ? AND ts >= ? AND ts < ? AND is_deleted = FALSE
        ORDER BY ts ASC
        "#,
    )
    .bind(employee_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}

/// Every employee's events for one day, grouped-friendly ordering
/// (employee first, then time).
pub async fn day_records_all(
    pool: &MySqlPool,
    day: NaiveDate,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let (start, end) = day_bounds(day);

    sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT * FROM attendance_records
        WHERE ts >= ? AND ts < ? AND is_deleted = FALSE
        ORDER BY employee_id ASC, ts ASC
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}

/// All events in `[from, to]` (whole days, inclusive), for reporting.
pub async fn range_records(
    pool: &MySqlPool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let (start, _) = day_bounds(from);
    let (_, end) = day_bounds(to);

    sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT * FROM attendance_records
        WHERE ts >= ? AND ts < ? AND is_deleted = FALSE
        ORDER BY employee_id ASC, ts ASC
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}

pub async fn fetch_record(pool: &MySqlPool, id: u64) -> Result<AttendanceRecord, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(
        "SELECT * FROM attendance_records WHERE id = ? AND is_deleted = FALSE",
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Insert a new event row, returning its id.
pub async fn insert_record(
    pool: &MySqlPool,
    rec: &NewAttendanceRecord,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO attendance_records
            (employee_id, ts, event_type, status, latitude, longitude, address,
             accuracy, device, notes, has_warning, warning_reason, warning_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(rec.employee_id)
    .bind(rec.ts)
    .bind(rec.event_type)
    .bind(rec.status)
    .bind(rec.latitude)
    .bind(rec.longitude)
    .bind(rec.address.as_deref())
    .bind(rec.accuracy)
    .bind(rec.device.as_deref())
    .bind(rec.notes.as_deref())
    .bind(rec.has_warning)
    .bind(rec.warning_reason.as_deref())
    .bind(rec.warning_at)
    .execute(pool)
    .await?;

    Ok(result.last_insert_id())
}

/// Soft delete; rows are never removed. Returns affected row count
/// (0 when the id is unknown or already deleted).
pub async fn soft_delete_record(
    pool: &MySqlPool,
    id: u64,
    now: NaiveDateTime,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE attendance_records
        SET is_deleted = TRUE, deleted_at = ?
        WHERE id = ? AND is_deleted = FALSE
        "#,
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Mark an open IN with a warning. Overwrites any reason a previous sweep
/// kind left on the row.
pub async fn flag_warning(
    pool: &MySqlPool,
    record_id: u64,
    reason: &str,
    now: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE attendance_records
        SET status = ?, has_warning = TRUE, warning_reason = ?, warning_at = ?
        WHERE id = ?
        "#,
    )
    .bind(EventStatus::Warning)
    .bind(reason)
    .bind(now)
    .bind(record_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Reset a misplaced LATE back to NORMAL (maintenance path).
pub async fn normalize_status(pool: &MySqlPool, record_id: u64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE attendance_records SET status = ? WHERE id = ?")
        .bind(EventStatus::Normal)
        .bind(record_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Claim the (employee, day, kind) sweep marker. Returns false when the
/// marker already exists, meaning this sweep kind already ran for the
/// employee on that day.
pub async fn try_mark_sweep(
    pool: &MySqlPool,
    employee_id: u64,
    day: NaiveDate,
    kind: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("INSERT IGNORE INTO sweep_markers (employee_id, day, kind) VALUES (?, ?, ?)")
            .bind(employee_id)
            .bind(day)
            .bind(kind)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn active_employee_count(pool: &MySqlPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE status = 'active'")
        .fetch_one(pool)
        .await
}
