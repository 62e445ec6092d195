// hackops-service/src/models/mod.rs
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use serde::{Deserialize, Serialize};

pub mod team;
pub use team::*;

pub mod schedule;
pub use schedule::*;

// Caller roles issued by the identity provider
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Hacker,
    Organizer,
    Judge,
}

// JWT claims structure for authentication
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub name: String,
    pub role: Role,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued at
}

/// Authenticated caller, resolved by the middleware and handed to the core
/// explicitly on every call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub name: String,
    pub role: Role,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
            role: claims.role,
        }
    }
}

// Custom error types
#[derive(Debug, Display, PartialEq)]
pub enum ServiceError {
    #[display(fmt = "Internal Server Error")]
    InternalServerError,
    #[display(fmt = "Validation error: {}", _0)]
    ValidationError(String),
    #[display(fmt = "Unauthorized")]
    Unauthorized,
    #[display(fmt = "Forbidden")]
    Forbidden,
    #[display(fmt = "User is already on a team")]
    AlreadyOnTeam,
    #[display(fmt = "Team not found")]
    TeamNotFound,
    #[display(fmt = "Conflict: {}", _0)]
    Conflict(String),
}

impl std::error::Error for ServiceError {}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::AlreadyOnTeam => StatusCode::CONFLICT,
            ServiceError::TeamNotFound => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::ValidationError(ref message) | ServiceError::Conflict(ref message) => {
                HttpResponse::build(self.status_code()).json(message)
            }
            _ => HttpResponse::build(self.status_code()).json(self.to_string()),
        }
    }
}
