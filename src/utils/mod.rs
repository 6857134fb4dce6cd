pub mod date;
pub mod db_utils;
pub mod finger_cache;
pub mod finger_filter;
