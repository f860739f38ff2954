//! Validation API.
//!
//! Thin HTTP surface over the validation engine:
//! - `POST /api/recon/validate` starts a run and streams its events
//! - `GET /api/recon/download/:job_id` serves the CSV artifact

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;

pub use error::ApiError;
pub use models::StartValidationRequest;
pub use router::{recon_router, ProfileStoreSettings, ReconState};
