// Upload surface: drop-target selection, form validation, the per-session
// in-progress flag and the HTTP handlers that tie them to the analyzer.

pub mod form;
pub mod handlers;
pub mod selection;
pub mod session;
