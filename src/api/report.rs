use std::str::FromStr;

use actix_web::{HttpResponse, Responder, web};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::attendance::report::{self, DailySummary, Period, RangeSummary};
use crate::utils::date::parse_date;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct DailyQuery {
    /// Day to report on, YYYY-MM-DD; defaults to today
    #[schema(example = "2026-01-05")]
    pub date: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct RangeQuery {
    /// weekly | monthly | yearly
    #[schema(example = "monthly")]
    pub period: String,
    /// Anchor date inside the period, YYYY-MM-DD; defaults to today
    #[schema(example = "2026-01-05")]
    pub date: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct FixLateQuery {
    /// Range start, YYYY-MM-DD
    #[schema(example = "2026-01-01")]
    pub from: String,
    /// Range end (inclusive), YYYY-MM-DD
    #[schema(example = "2026-01-31")]
    pub to: String,
}

/// One day's attendance counts
#[utoipa::path(
    get,
    path = "/api/v1/report/daily",
    params(DailyQuery),
    responses(
        (status = 200, description = "Daily summary", body = DailySummary),
        (status = 400, description = "Invalid date", body = Object, example = json!({
            "message": "Invalid date, expected YYYY-MM-DD"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Report"
)]
pub async fn daily(
    pool: web::Data<MySqlPool>,
    query: web::Query<DailyQuery>,
) -> actix_web::Result<impl Responder> {
    let date = match &query.date {
        Some(raw) => match parse_date(raw) {
            Some(d) => d,
            None => {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "message": "Invalid date, expected YYYY-MM-DD"
                })));
            }
        },
        None => Local::now().date_naive(),
    };

    let summary = report::daily_summary(pool.get_ref(), date).await.map_err(|e| {
        tracing::error!(error = %e, %date, "Daily report failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Weekly/monthly/yearly rollup
#[utoipa::path(
    get,
    path = "/api/v1/report/range",
    params(RangeQuery),
    responses(
        (status = 200, description = "Range summary", body = RangeSummary),
        (status = 400, description = "Invalid period or date", body = Object, example = json!({
            "message": "Invalid period. Allowed: weekly, monthly, yearly"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Report"
)]
pub async fn range(
    pool: web::Data<MySqlPool>,
    query: web::Query<RangeQuery>,
) -> actix_web::Result<impl Responder> {
    let period = match Period::from_str(&query.period) {
        Ok(p) => p,
        Err(_) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Invalid period. Allowed: weekly, monthly, yearly"
            })));
        }
    };

    let anchor = match &query.date {
        Some(raw) => match parse_date(raw) {
            Some(d) => d,
            None => {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "message": "Invalid date, expected YYYY-MM-DD"
                })));
            }
        },
        None => Local::now().date_naive(),
    };

    let summary = report::range_summary(pool.get_ref(), period, anchor)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, period = %period, %anchor, "Range report failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Normalize historical LATE statuses: only the first IN of a day may be LATE
#[utoipa::path(
    post,
    path = "/api/v1/report/fix-late",
    params(FixLateQuery),
    responses(
        (status = 200, description = "Maintenance completed", body = Object, example = json!({
            "corrected": 12
        })),
        (status = 400, description = "Invalid range", body = Object, example = json!({
            "message": "Invalid range, expected from <= to as YYYY-MM-DD"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Report"
)]
pub async fn fix_late(
    pool: web::Data<MySqlPool>,
    query: web::Query<FixLateQuery>,
) -> actix_web::Result<impl Responder> {
    let (from, to) = match (parse_date(&query.from), parse_date(&query.to)) {
        (Some(from), Some(to)) if from <= to => (from, to),
        _ => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Invalid range, expected from <= to as YYYY-MM-DD"
            })));
        }
    };

    let corrected = report::fix_late_status(pool.get_ref(), from, to)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, %from, %to, "fix-late maintenance failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "corrected": corrected
    })))
}
