pub mod schedule_service;
pub mod team_service;
