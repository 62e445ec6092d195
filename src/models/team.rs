use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ServiceError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub devpost: Option<String>,
    pub join_code: String,
    pub members: Vec<String>, // user ids
    // Bumped by the store on every successful save
    pub revision: u64,
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|member| member == user_id)
    }
}

/// A team with its member ids resolved to user records.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamProfile {
    pub id: String,
    pub name: String,
    pub devpost: Option<String>,
    pub join_code: String,
    pub members: Vec<User>,
}

impl TeamProfile {
    pub fn new(team: Team, members: Vec<User>) -> Self {
        Self {
            id: team.id,
            name: team.name,
            devpost: team.devpost,
            join_code: team.join_code,
            members,
        }
    }
}

// Raw body accepted by POST and PATCH /team
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TeamRequest {
    pub join_code: Option<String>,
    pub team_name: Option<String>,
    pub devpost: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TeamUpdate {
    pub team_name: Option<String>,
    pub devpost: Option<String>,
}

/// Every mutating team operation, validated before dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum TeamCommand {
    Create {
        team_name: String,
        devpost: Option<String>,
    },
    Join {
        join_code: String,
    },
    Update(TeamUpdate),
    Leave,
}

impl TeamCommand {
    // POST: a join code takes precedence over a team name, and the other
    // fields are ignored when joining
    pub fn from_post(request: TeamRequest) -> Result<Self, ServiceError> {
        if let Some(join_code) = non_blank(request.join_code) {
            return Ok(TeamCommand::Join { join_code });
        }
        match non_blank(request.team_name) {
            Some(team_name) => Ok(TeamCommand::Create {
                team_name,
                devpost: validate_devpost(request.devpost)?,
            }),
            None => Err(ServiceError::ValidationError(
                "Either joinCode or teamName required.".to_string(),
            )),
        }
    }

    pub fn from_patch(request: TeamRequest) -> Result<Self, ServiceError> {
        if request.join_code.is_some() {
            return Err(ServiceError::ValidationError(
                "joinCode cannot be changed".to_string(),
            ));
        }
        Ok(TeamCommand::Update(TeamUpdate {
            team_name: non_blank(request.team_name),
            devpost: validate_devpost(request.devpost)?,
        }))
    }
}

/// Result of a dispatched team command.
#[derive(Debug, Clone, PartialEq)]
pub enum TeamOutcome {
    Created(Team),
    Joined(Team),
    Updated(Team),
    Deleted { team_name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeaveOutcome {
    Updated(Team),
    Deleted { team_name: String },
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_devpost(devpost: Option<String>) -> Result<Option<String>, ServiceError> {
    match non_blank(devpost) {
        Some(url) if !crate::utils::is_http_url(&url) => Err(ServiceError::ValidationError(
            format!("devpost must be an http(s) URL, got '{}'", url),
        )),
        other => Ok(other),
    }
}
