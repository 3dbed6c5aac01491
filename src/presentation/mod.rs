// Presentation layer - Local HTTP surface for status bars
pub mod app_state;
pub mod handlers;
pub mod routes;
