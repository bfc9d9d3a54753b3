//! Authentication service for the recipe catalog
//!
//! Registers users, logs them in by issuing an access/refresh token pair
//! backed by a stored session, and renews access tokens from a valid
//! refresh token.

pub mod error;
pub mod password;
pub mod routes;
pub mod state;
pub mod validation;

pub use routes::create_router;
pub use state::AppState;
