use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::RoomConfig;
use crate::store::Store;

/// Shared application state handed to every handler through `web::Data`.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub rooms: Vec<RoomConfig>,
    pub judging_form_path: String,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &AppConfig) -> Self {
        Self {
            store,
            rooms: config.rooms(),
            judging_form_path: config.judging_form_path.clone(),
        }
    }
}
