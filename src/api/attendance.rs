use std::str::FromStr;
use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::attendance::sweep::{self, SweepKind};
use crate::attendance::{self, EventInput, records};
use crate::config::Config;
use crate::model::attendance::AttendanceRecord;
use crate::model::location::Location;
use crate::notify::Notifier;
use crate::utils::{finger_cache, finger_filter};

#[derive(Deserialize, ToSchema)]
pub struct GeoPointDto {
    #[schema(example = 23.7808)]
    pub latitude: f64,
    #[schema(example = 90.4074)]
    pub longitude: f64,
    #[schema(example = "Head office", nullable = true)]
    pub address: Option<String>,
    #[schema(example = 12.5, nullable = true)]
    pub accuracy: Option<f64>,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckRequest {
    #[schema(example = 1000)]
    pub employee_id: u64,
    pub location: GeoPointDto,
    #[schema(example = "android-app", nullable = true)]
    pub device: Option<String>,
    #[schema(nullable = true)]
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct FingerRequest {
    #[schema(example = 42)]
    pub finger_number: u32,
    #[schema(example = "Head office")]
    pub location_name: String,
    #[schema(example = "terminal-2", nullable = true)]
    pub device: Option<String>,
    #[schema(nullable = true)]
    pub notes: Option<String>,
}

/// GPS check event. Whether this is an IN or an OUT, and its status, are
/// decided from the day's prior events and the shift thresholds.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check",
    request_body = CheckRequest,
    responses(
        (status = 200, description = "Event recorded", body = AttendanceRecord),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn check_event(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CheckRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = payload.employee_id;

    let exists = sqlx::query_scalar::<_, u64>("SELECT id FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Employee lookup failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if exists.is_none() {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    let payload = payload.into_inner();
    let input = EventInput {
        latitude: payload.location.latitude,
        longitude: payload.location.longitude,
        address: payload.location.address,
        accuracy: payload.location.accuracy,
        device: payload.device,
        notes: payload.notes,
    };

    let record = attendance::record_event(pool.get_ref(), &config.shift_policy(), employee_id, input)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Check event failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(record))
}

/// Fingerprint-terminal check event. Same decision logic as the GPS
/// endpoint; the employee is resolved via the enrollment filter and cache,
/// coordinates come from the named location.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/finger",
    request_body = FingerRequest,
    responses(
        (status = 200, description = "Event recorded", body = AttendanceRecord),
        (status = 404, description = "Fingerprint or location unknown", body = Object, example = json!({
            "message": "Fingerprint not enrolled"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn finger_event(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<FingerRequest>,
) -> actix_web::Result<impl Responder> {
    let finger_number = payload.finger_number;

    // Filter first: a definite miss skips the directory entirely.
    if !finger_filter::might_exist(finger_number) {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Fingerprint not enrolled"
        })));
    }

    let employee_id = match finger_cache::resolve(finger_number).await {
        Some(id) => id,
        None => {
            let found = sqlx::query_scalar::<_, u64>(
                "SELECT id FROM employees WHERE finger_number = ?",
            )
            .bind(finger_number)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, finger_number, "Fingerprint lookup failed");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

            match found {
                Some(id) => {
                    finger_cache::remember(finger_number, id).await;
                    id
                }
                // Filter false positive
                None => {
                    return Ok(HttpResponse::NotFound().json(json!({
                        "message": "Fingerprint not enrolled"
                    })));
                }
            }
        }
    };

    let location = sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE name = ?")
        .bind(&payload.location_name)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, location = %payload.location_name, "Location lookup failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let Some(location) = location else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Location not found"
        })));
    };

    let payload = payload.into_inner();
    let input = EventInput {
        latitude: location.latitude,
        longitude: location.longitude,
        address: location.address.or(Some(location.name)),
        accuracy: None,
        device: payload.device,
        notes: payload.notes,
    };

    let record = attendance::record_event(pool.get_ref(), &config.shift_policy(), employee_id, input)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Finger check event failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(record))
}

/// Today's projection for one employee
#[utoipa::path(
    get,
    path = "/api/v1/attendance/today/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Current day status", body = attendance::TodayStatus),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn today_status(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let exists = sqlx::query_scalar::<_, u64>("SELECT id FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Employee lookup failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if exists.is_none() {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    let status = attendance::today_status(pool.get_ref(), employee_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Today status failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(status))
}

/// Soft-delete one attendance record
#[utoipa::path(
    delete,
    path = "/api/v1/attendance/{record_id}",
    params(
        ("record_id" = u64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Record deleted", body = Object, example = json!({
            "message": "Record deleted"
        })),
        (status = 404, description = "Record not found", body = Object, example = json!({
            "message": "Record not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn delete_record(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let record_id = path.into_inner();
    let now = Local::now().naive_local();

    let affected = records::soft_delete_record(pool.get_ref(), record_id, now)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, record_id, "Soft delete failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Record not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Record deleted"
    })))
}

/// Manually trigger one warning sweep
#[utoipa::path(
    post,
    path = "/api/v1/attendance/sweep/{kind}",
    params(
        ("kind" = String, Path, description = "midday | evening | past_day | auto_checkout")
    ),
    responses(
        (status = 200, description = "Sweep completed", body = Object, example = json!({
            "processed_count": 3
        })),
        (status = 400, description = "Unknown sweep kind", body = Object, example = json!({
            "message": "Unknown sweep kind"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn trigger_sweep(
    pool: web::Data<MySqlPool>,
    notifier: web::Data<Arc<dyn Notifier>>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let kind = match SweepKind::from_str(&path.into_inner()) {
        Ok(kind) => kind,
        Err(_) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Unknown sweep kind"
            })));
        }
    };

    let processed = sweep::run_sweep(pool.get_ref(), &**notifier.get_ref(), kind)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, kind = %kind, "Manual sweep failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "processed_count": processed
    })))
}
