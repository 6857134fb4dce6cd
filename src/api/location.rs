use crate::{
    model::location::Location,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

const UPDATABLE_COLUMNS: &[&str] = &["name", "latitude", "longitude", "radius_m", "address"];

#[derive(Deserialize, ToSchema)]
pub struct CreateLocation {
    #[schema(example = "Head office")]
    pub name: String,
    #[schema(example = 23.7808)]
    pub latitude: f64,
    #[schema(example = 90.4074)]
    pub longitude: f64,
    #[schema(example = 150.0)]
    pub radius_m: f64,
    #[schema(example = "12 Kemal Ataturk Ave, Dhaka", nullable = true)]
    pub address: Option<String>,
}

/// Create Location
#[utoipa::path(
    post,
    path = "/api/v1/location",
    request_body = CreateLocation,
    responses(
        (status = 200, description = "Location created successfully", body = Object, example = json!({
            "message": "Location created successfully"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Location"
)]
pub async fn create_location(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLocation>,
) -> impl Responder {
    let result = sqlx::query(
        r#"
        INSERT INTO locations (name, latitude, longitude, radius_m, address)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.name)
    .bind(payload.latitude)
    .bind(payload.longitude)
    .bind(payload.radius_m)
    .bind(payload.address.as_deref())
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => HttpResponse::Ok().json(json!({
            "message": "Location created successfully"
        })),
        Err(e) => {
            error!(error = %e, "Failed to create location");
            HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            }))
        }
    }
}

/// List Locations
#[utoipa::path(
    get,
    path = "/api/v1/location",
    responses(
        (status = 200, description = "All geofence locations", body = [Location]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Location"
)]
pub async fn list_locations(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let locations = sqlx::query_as::<_, Location>("SELECT * FROM locations ORDER BY name ASC")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch locations");
            ErrorInternalServerError("Database error")
        })?;

    Ok(HttpResponse::Ok().json(locations))
}

/// Get Location by ID
#[utoipa::path(
    get,
    path = "/api/v1/location/{location_id}",
    params(
        ("location_id" = u64, Path, description = "Location ID")
    ),
    responses(
        (status = 200, description = "Location found", body = Location),
        (status = 404, description = "Location not found", body = Object, example = json!({
            "message": "Location not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Location"
)]
pub async fn get_location(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let location_id = path.into_inner();

    let location = sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = ?")
        .bind(location_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, location_id, "Failed to fetch location");
            ErrorInternalServerError("Internal Server Error")
        })?;

    match location {
        Some(loc) => Ok(HttpResponse::Ok().json(loc)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Location not found"
        }))),
    }
}

/// Update Location
#[utoipa::path(
    put,
    path = "/api/v1/location/{location_id}",
    params(
        ("location_id" = u64, Path, description = "Location ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Location updated successfully", body = Object, example = json!({
            "message": "Location updated successfully"
        })),
        (status = 400, description = "Unknown or empty update payload"),
        (status = 404, description = "Location not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Location"
)]
pub async fn update_location(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let location_id = path.into_inner();

    let update = build_update_sql("locations", &body, UPDATABLE_COLUMNS, "id", location_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Location not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Location updated successfully"
    })))
}
