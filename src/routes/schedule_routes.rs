use crate::models::{Assignment, JudgeScheduleQuery, Role, ServiceError};
use crate::services::schedule_service;
use crate::state::AppState;
use crate::utils::{get_identity_from_request, require_role};
use actix_web::{get, put, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{info, warn};
use serde_json::json;

// Replace the whole schedule with an imported assignment list
#[put("/schedule")]
async fn import_schedule(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<Vec<Assignment>>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    require_role(&identity, &[Role::Organizer])?;

    let assignments = body.into_inner();
    info!(
        "📥 Importing {} assignments from user: {}",
        assignments.len(),
        identity.user_id
    );

    let unknown = assignments
        .iter()
        .filter(|a| !state.rooms.iter().any(|room| room.id == a.room))
        .count();
    if unknown > 0 {
        warn!("⚠️ {} imported assignments name an unconfigured room", unknown);
    }

    state.store.replace_assignments(&assignments)?;

    info!("✅ Schedule replaced");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Schedule imported successfully",
        "count": assignments.len(),
        "unknownRooms": unknown
    })))
}

// Time x room grid for organizers
#[get("/schedule/organizer")]
async fn organizer_schedule(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    require_role(&identity, &[Role::Organizer])?;

    let assignments = state.store.load_assignments()?;
    let schedule = schedule_service::organizer_schedule(&assignments, &state.rooms);

    info!(
        "📋 Organizer grid: {} rows across {} rooms",
        schedule.rows.len(),
        schedule.rooms.len()
    );
    Ok(HttpResponse::Ok().json(schedule))
}

// Flat list for judges and hackers, hiding past sessions by default
#[get("/schedule/judge")]
async fn judge_schedule(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<JudgeScheduleQuery>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;

    let assignments = state.store.load_assignments()?;
    let cutoff = query
        .cutoff
        .unwrap_or_else(|| schedule_service::cutoff_index(&assignments, Utc::now()));
    let rows = schedule_service::judge_schedule(
        &assignments,
        cutoff,
        query.show_past,
        &state.judging_form_path,
    );

    info!(
        "📋 Judge schedule for user: {}: {} rows (cutoff {}, show past {})",
        identity.user_id,
        rows.len(),
        cutoff,
        query.show_past
    );
    Ok(HttpResponse::Ok().json(rows))
}

// Register all schedule routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(import_schedule)
        .service(organizer_schedule)
        .service(judge_schedule);
}
