// src/routes/mod.rs
pub mod schedule_routes;
pub mod team_routes;
