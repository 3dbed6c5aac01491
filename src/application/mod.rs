// Application layer - Fetch/render cycle and scheduling
pub mod poller;
pub mod presenter;
pub mod reading_source;
pub mod status_service;
pub mod status_sink;
