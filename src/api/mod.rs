//! HTTP API module for the payroll engine.
//!
//! Exposes the dispatcher's message protocol over HTTP.

mod handlers;
mod response;
mod state;

pub use handlers::create_router;
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
