use crate::models::{Identity, Role, ServiceError, TeamCommand, TeamOutcome, TeamRequest};
use crate::services::team_service;
use crate::state::AppState;
use crate::utils::{get_identity_from_request, require_role};
use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use log::{error, info};

// Only hackers manage teams; checked before any team logic runs
fn hacker_identity(req: &HttpRequest) -> Result<Identity, ServiceError> {
    let identity = get_identity_from_request(req)?;
    require_role(&identity, &[Role::Hacker])?;
    Ok(identity)
}

fn run_command(
    state: &AppState,
    identity: &Identity,
    command: TeamCommand,
) -> Result<HttpResponse, ServiceError> {
    team_service::ensure_user(state.store.as_ref(), identity)?;

    let outcome = team_service::execute(state.store.as_ref(), identity, command).map_err(|e| {
        error!("❌ Team operation failed for user: {}: {}", identity.user_id, e);
        e
    })?;

    Ok(match outcome {
        TeamOutcome::Created(team) | TeamOutcome::Joined(team) => {
            HttpResponse::Created().json(team)
        }
        TeamOutcome::Updated(team) => HttpResponse::Ok().json(team),
        TeamOutcome::Deleted { team_name } => {
            HttpResponse::Ok().json(format!("Team {} deleted successfully.", team_name))
        }
    })
}

// Get the caller's team with members resolved
#[get("/team")]
async fn get_my_team(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServiceError> {
    let identity = hacker_identity(&req)?;

    info!("🔍 Fetching team for user: {}", identity.user_id);
    team_service::ensure_user(state.store.as_ref(), &identity)?;

    match team_service::get_my_team(state.store.as_ref(), &identity.user_id)? {
        Some(profile) => {
            info!("✅ Found team: {}", profile.id);
            Ok(HttpResponse::Ok().json(profile))
        }
        None => {
            info!("User: {} has no team", identity.user_id);
            Ok(HttpResponse::NoContent().finish())
        }
    }
}

// Create a team, or join one by code
#[post("/team")]
async fn create_or_join_team(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<TeamRequest>,
) -> Result<HttpResponse, ServiceError> {
    let identity = hacker_identity(&req)?;
    let command = TeamCommand::from_post(body.into_inner())?;

    info!("📝 {:?} for user: {}", command, identity.user_id);
    run_command(&state, &identity, command)
}

// Rename the team or change its devpost link
#[patch("/team")]
async fn update_team(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<TeamRequest>,
) -> Result<HttpResponse, ServiceError> {
    let identity = hacker_identity(&req)?;
    let command = TeamCommand::from_patch(body.into_inner())?;

    info!("🔄 Updating team for user: {}", identity.user_id);
    run_command(&state, &identity, command)
}

// Leave the team; the last member out deletes it
#[delete("/team")]
async fn leave_team(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServiceError> {
    let identity = hacker_identity(&req)?;

    info!("🗑️ User: {} leaving team", identity.user_id);
    run_command(&state, &identity, TeamCommand::Leave)
}

// Register all team routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_my_team)
        .service(create_or_join_team)
        .service(update_team)
        .service(leave_team);
}
