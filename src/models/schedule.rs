use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Judge {
    pub id: String,
    pub name: String,
}

/// One judging slot as imported from the organizers' spreadsheet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    // ISO timestamp, kept verbatim
    pub time: String,
    pub room: String,
    pub team_id: String,
    pub team_name: String,
    pub member_names: Vec<String>,
    pub devpost: String,
    pub judges: Vec<Judge>,
    // room join URL
    pub zoom: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RoomConfig {
    pub id: String,
    pub label: String,
    pub url: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GridCell {
    pub room: String,
    pub assignment: Option<Assignment>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub time: String,
    pub display_time: String,
    pub cells: Vec<GridCell>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OrganizerSchedule {
    pub rooms: Vec<RoomConfig>,
    pub rows: Vec<GridRow>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProjectLink {
    pub name: String,
    pub link: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JudgeRow {
    pub time: String,
    pub display_time: String,
    pub project: ProjectLink,
    pub team_members: Vec<String>,
    pub judges: Vec<String>,
    // judging form link for this team
    pub form: String,
    pub room: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct JudgeScheduleQuery {
    pub cutoff: Option<usize>,
    #[serde(default)]
    pub show_past: bool,
}
