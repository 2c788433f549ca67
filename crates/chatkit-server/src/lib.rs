//! HTTP surface for the ChatKit starter: a single `POST /chatkit` endpoint
//! backed by [`ChatServer`], which dispatches typed requests against a
//! [`chatkit_store::Store`] and an [`chatkit_agent::AgentRunner`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult, ServerError};
pub use router::build_router;
pub use server::{ChatServer, ProcessResult};
pub use state::AppState;
