use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Named geofence employees check in against. The radius is descriptive only;
/// check-in does not reject events outside it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 3,
        "name": "Head office",
        "latitude": 23.7808,
        "longitude": 90.4074,
        "radius_m": 150.0,
        "address": "12 Kemal Ataturk Ave, Dhaka"
    })
)]
pub struct Location {
    #[schema(example = 3)]
    pub id: u64,

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
