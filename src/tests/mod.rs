use actix_web::web;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::{Identity, Role};
use crate::state::AppState;
use crate::store::MemoryStore;
use crate::utils::jwt;

pub(crate) const SECRET: &str = "test-secret";

// Full app (auth + every route) over the given `web::Data<AppState>`
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .wrap(crate::utils::auth_middleware::Authentication::new(
                    crate::tests::SECRET,
                ))
                .configure(crate::routes::team_routes::init_routes)
                .configure(crate::routes::schedule_routes::init_routes),
        )
        .await
    };
}


pub(crate) fn test_state() -> (Arc<MemoryStore>, web::Data<AppState>) {
    let store = Arc::new(MemoryStore::new());
    let state = web::Data::new(AppState::new(store.clone(), &AppConfig::default()));
    (store, state)
}

pub(crate) fn bearer(user_id: &str, role: Role) -> (&'static str, String) {
    let identity = Identity {
        user_id: user_id.to_string(),
        name: format!("Name of {}", user_id),
        role,
    };
    let token = jwt::generate_token(&identity, SECRET).unwrap();
    ("Authorization", format!("Bearer {}", token))
}
