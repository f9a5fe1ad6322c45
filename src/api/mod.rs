pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod validation;

pub use error::ApiError;
pub use routes::{create_router, AppState};
