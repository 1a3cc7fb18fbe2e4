//! HTTP API: LoRA listing and keyword lookups for host UIs

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::{AppState, create_router};
