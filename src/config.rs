// hackops-service/src/config.rs
use log::warn;
use std::env;

use crate::models::RoomConfig;
use crate::services::schedule_service;

pub const DEFAULT_ROOM_COUNT: usize = 4;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub address: String,
    pub storage_dir: String,
    pub jwt_secret: String,
    pub room_count: usize,
    pub room_url_base: String,
    pub judging_form_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:9090".to_string(),
            storage_dir: "./storage".to_string(),
            jwt_secret: "hackops_dev_secret_key".to_string(),
            room_count: DEFAULT_ROOM_COUNT,
            room_url_base: "https://vhl.ink/room-".to_string(),
            judging_form_path: "/judging".to_string(),
        }
    }
}

impl AppConfig {
    // Load `.env` if present, then read overrides from the process environment
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        if env::var("JWT_SECRET").is_err() {
            warn!("JWT_SECRET not set, falling back to the development secret");
        }

        Self {
            address: env::var("SERVER_ADDRESS").unwrap_or(defaults.address),
            storage_dir: env::var("STORAGE_DIR").unwrap_or(defaults.storage_dir),
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            room_count: parse_room_count(env::var("NUM_ROOMS").ok().as_deref()),
            room_url_base: env::var("ROOM_URL_BASE").unwrap_or(defaults.room_url_base),
            judging_form_path: env::var("JUDGING_FORM_PATH")
                .unwrap_or(defaults.judging_form_path),
        }
    }

    pub fn rooms(&self) -> Vec<RoomConfig> {
        schedule_service::build_rooms(self.room_count, &self.room_url_base)
    }
}

fn parse_room_count(raw: Option<&str>) -> usize {
    match raw.map(|value| value.trim().parse::<usize>()) {
        None => DEFAULT_ROOM_COUNT,
        Some(Ok(count)) if count > 0 => count,
        Some(_) => {
            warn!("Ignoring invalid NUM_ROOMS, using {}", DEFAULT_ROOM_COUNT);
            DEFAULT_ROOM_COUNT
        }
    }
}
