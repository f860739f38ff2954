//! Directory service client.
//!
//! Wraps the directory's cursor-based pagination protocol behind a typed
//! client: OAuth2 client-credentials authentication with proactive token
//! refresh, and paginated user search with the fixed field projection the
//! validation engine consumes.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;

pub use auth::{TokenCredentials, TokenProvider};
pub use client::DirectoryClient;
pub use error::{DirectoryError, DirectoryResult};
pub use models::{DirectoryRecord, DirectorySearchResponse};
