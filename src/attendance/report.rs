//! Attendance rollups. Every report re-derives the first-IN-per-day rule over
//! raw rows for its date range; nothing is cached or incrementally maintained.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use sqlx::MySqlPool;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::attendance::{policy, records};
use crate::model::attendance::AttendanceRecord;
use crate::utils::date::{all_days_of_month, all_days_of_year, week_dates};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Period {
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    pub fn dates(&self, anchor: NaiveDate) -> Vec<NaiveDate> {
        match self {
            Period::Weekly => week_dates(anchor),
            Period::Monthly => all_days_of_month(anchor.year(), anchor.month()),
            Period::Yearly => all_days_of_year(anchor.year()),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "date": "2026-01-05",
    "present": 42,
    "late": 5,
    "absent": 8,
    "attendance_rate": 84.0
}))]
pub struct DailySummary {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = 42)]
    pub present: u64,
    #[schema(example = 5)]
    pub late: u64,
    #[schema(example = 8)]
    pub absent: u64,
    /// Percent of active employees with at least one check-in.
    #[schema(example = 84.0)]
    pub attendance_rate: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RangeSummary {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub from: NaiveDate,
    #[schema(example = "2026-01-11", format = "date", value_type = String)]
    pub to: NaiveDate,
    #[schema(example = 50)]
    pub active_employees: u64,
    /// Mean of the daily rates over the range.
    #[schema(example = 81.3)]
    pub attendance_rate: f64,
    pub days: Vec<DailySummary>,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Split range rows (ordered employee, ts) into day -> employee -> events.
pub fn partition_by_day(
    rows: Vec<AttendanceRecord>,
) -> BTreeMap<NaiveDate, BTreeMap<u64, Vec<AttendanceRecord>>> {
    let mut out: BTreeMap<NaiveDate, BTreeMap<u64, Vec<AttendanceRecord>>> = BTreeMap::new();
    for row in rows {
        out.entry(row.day())
            .or_default()
            .entry(row.employee_id)
            .or_default()
            .push(row);
    }
    // Rows arrive employee-major; each employee's day sequence must be
    // time-ordered for the first-IN rule.
    for by_employee in out.values_mut() {
        for day in by_employee.values_mut() {
            day.sort_by_key(|r| r.ts);
        }
    }
    out
}

/// One day's counts. `present` is employees with at least one IN; `late` is
/// employees whose first IN of the day carries LATE.
pub fn compute_daily(
    date: NaiveDate,
    by_employee: &BTreeMap<u64, Vec<AttendanceRecord>>,
    active_employees: u64,
) -> DailySummary {
    let mut present = 0u64;
    let mut late = 0u64;

    for day in by_employee.values() {
        let first_in = day.iter().find(|r| r.is_in());
        if let Some(first_in) = first_in {
            present += 1;
            if first_in.status == crate::model::attendance::EventStatus::Late {
                late += 1;
            }
        }
    }

    let absent = active_employees.saturating_sub(present);
    let attendance_rate = if active_employees == 0 {
        0.0
    } else {
        round2(present as f64 / active_employees as f64 * 100.0)
    };

    DailySummary {
        date,
        present,
        late,
        absent,
        attendance_rate,
    }
}

pub fn compute_range(
    dates: &[NaiveDate],
    by_day: &BTreeMap<NaiveDate, BTreeMap<u64, Vec<AttendanceRecord>>>,
    active_employees: u64,
) -> RangeSummary {
    static EMPTY: BTreeMap<u64, Vec<AttendanceRecord>> = BTreeMap::new();

    let days: Vec<DailySummary> = dates
        .iter()
        .map(|&date| compute_daily(date, by_day.get(&date).unwrap_or(&EMPTY), active_employees))
        .collect();

    let attendance_rate = if days.is_empty() {
        0.0
    } else {
        round2(days.iter().map(|d| d.attendance_rate).sum::<f64>() / days.len() as f64)
    };

    RangeSummary {
        from: dates.first().copied().unwrap_or_default(),
        to: dates.last().copied().unwrap_or_default(),
        active_employees,
        attendance_rate,
        days,
    }
}

pub async fn daily_summary(pool: &MySqlPool, date: NaiveDate) -> Result<DailySummary, sqlx::Error> {
    let rows = records::day_records_all(pool, date).await?;
    let by_employee = crate::attendance::sweep::group_by_employee(rows);
    let active = records::active_employee_count(pool).await?.max(0) as u64;
    Ok(compute_daily(date, &by_employee, active))
}

pub async fn range_summary(
    pool: &MySqlPool,
    period: Period,
    anchor: NaiveDate,
) -> Result<RangeSummary, sqlx::Error> {
    let dates = period.dates(anchor);
    let (from, to) = match (dates.first(), dates.last()) {
        (Some(&f), Some(&t)) => (f, t),
        _ => (anchor, anchor),
    };

    let rows = records::range_records(pool, from, to).await?;
    let by_day = partition_by_day(rows);
    let active = records::active_employee_count(pool).await?.max(0) as u64;
    Ok(compute_range(&dates, &by_day, active))
}

/// Retroactively force every non-first same-day IN off LATE. Returns the
/// number of rows corrected. Exists because earlier write paths assigned LATE
/// to repeat check-ins; the current path never does.
pub async fn fix_late_status(
    pool: &MySqlPool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<u64, sqlx::Error> {
    let rows = records::range_records(pool, from, to).await?;
    let by_day = partition_by_day(rows);

    let mut corrected = 0u64;
    for by_employee in by_day.values() {
        for day in by_employee.values() {
            for id in policy::misplaced_late_ids(day) {
                corrected += records::normalize_status(pool, id).await?;
            }
        }
    }

    Ok(corrected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::{EventStatus, EventType};
    use chrono::NaiveTime;

    fn rec(
        id: u64,
        employee_id: u64,
        day: NaiveDate,
        hms: &str,
        event_type: EventType,
        status: EventStatus,
    ) -> AttendanceRecord {
        AttendanceRecord {
            id,
            employee_id,
            ts: day.and_time(NaiveTime::parse_from_str(hms, "%H:%M:%S").unwrap()),
            event_type,
            status,
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
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    #[test]
    fn daily_counts_first_in_late_only() {
        let rows = vec![
            // employee 1: late first IN, normal second IN
            rec(1, 1, day(), "09:15:00", EventType::In, EventStatus::Late),
            rec(2, 1, day(), "12:00:00", EventType::Out, EventStatus::Early),
            rec(3, 1, day(), "13:00:00", EventType::In, EventStatus::Normal),
            // employee 2: on time
            rec(4, 2, day(), "08:30:00", EventType::In, EventStatus::Normal),
        ];
        let by_employee = crate::attendance::sweep::group_by_employee(rows);

        let summary = compute_daily(day(), &by_employee, 4);
        assert_eq!(summary.present, 2);
        assert_eq!(summary.late, 1);
        assert_eq!(summary.absent, 2);
        assert_eq!(summary.attendance_rate, 50.0);
    }

    #[test]
    fn daily_rate_guards_zero_active_employees() {
        let by_employee = BTreeMap::new();
        let summary = compute_daily(day(), &by_employee, 0);
        assert_eq!(summary.present, 0);
        assert_eq!(summary.absent, 0);
        assert_eq!(summary.attendance_rate, 0.0);
    }

    #[test]
    fn range_averages_daily_rates_and_fills_empty_days() {
        let d1 = day();
        let d2 = d1.succ_opt().unwrap();
        let rows = vec![rec(1, 1, d1, "08:30:00", EventType::In, EventStatus::Normal)];

        let by_day = partition_by_day(rows);
        let summary = compute_range(&[d1, d2], &by_day, 2);

        assert_eq!(summary.from, d1);
        assert_eq!(summary.to, d2);
        assert_eq!(summary.days.len(), 2);
        assert_eq!(summary.days[0].present, 1);
        assert_eq!(summary.days[1].present, 0);
        assert_eq!(summary.days[1].absent, 2);
        // (50 + 0) / 2
        assert_eq!(summary.attendance_rate, 25.0);
    }

    #[test]
    fn partition_orders_each_day_by_time() {
        let d = day();
        let rows = vec![
            rec(2, 1, d, "13:00:00", EventType::In, EventStatus::Normal),
            rec(1, 1, d, "08:30:00", EventType::In, EventStatus::Late),
        ];
        let by_day = partition_by_day(rows);
        let seq = &by_day[&d][&1];
        assert_eq!(seq[0].id, 1);
        assert_eq!(seq[1].id, 2);
    }

    #[test]
    fn period_parses_and_expands() {
        use std::str::FromStr;
        assert_eq!(Period::from_str("weekly").unwrap(), Period::Weekly);
        assert_eq!(Period::from_str("monthly").unwrap(), Period::Monthly);
        assert_eq!(Period::from_str("yearly").unwrap(), Period::Yearly);
        assert!(Period::from_str("daily").is_err());

        let anchor = day();
        assert_eq!(Period::Weekly.dates(anchor).len(), 7);
        assert_eq!(Period::Monthly.dates(anchor).len(), 31);
        assert_eq!(Period::Yearly.dates(anchor).len(), 365);
    }
}
