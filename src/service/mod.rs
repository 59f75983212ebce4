pub mod access;
pub mod calendar_service;
pub mod date_picker;
pub mod event_flow;
pub mod routing;
pub mod session;
