use crate::attendance::policy::ShiftPolicy;
use chrono::NaiveTime;
use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,

    /// First check-in strictly after this local time is LATE
    pub late_after: NaiveTime,
    /// Check-out strictly before this local time is EARLY, after is OVERTIME
    pub early_before: NaiveTime,

    // Daily sweep fire times (local)
    pub sweep_midday_at: NaiveTime,
    pub sweep_evening_at: NaiveTime,
    pub sweep_auto_checkout_at: NaiveTime,
    pub sweep_past_day_at: NaiveTime,

    // Rate limiting
    pub rate_check_per_min: u32,
    pub rate_api_per_min: u32,

    pub api_prefix: String,
}

fn time_var(key: &str, default: &str) -> NaiveTime {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    NaiveTime::parse_from_str(&raw, "%H:%M")
        .unwrap_or_else(|_| panic!("{} must be HH:MM, got {}", key, raw))
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),

            // One canonical threshold pair for every entry point
            late_after: time_var("LATE_AFTER", "09:00"),
            early_before: time_var("EARLY_BEFORE", "18:00"),

            sweep_midday_at: time_var("SWEEP_MIDDAY_AT", "12:30"),
            sweep_evening_at: time_var("SWEEP_EVENING_AT", "18:30"),
            sweep_auto_checkout_at: time_var("SWEEP_AUTO_CHECKOUT_AT", "23:55"),
            sweep_past_day_at: time_var("SWEEP_PAST_DAY_AT", "00:10"),

            rate_check_per_min: env::var("RATE_CHECK_PER_MIN")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap(),
            rate_api_per_min: env::var("RATE_API_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
        }
    }

    pub fn shift_policy(&self) -> ShiftPolicy {
        ShiftPolicy {
            late_after: self.late_after,
            early_before: self.early_before,
        }
    }
}
