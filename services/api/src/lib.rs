//! Catalog HTTP service for users, authors and recipes
//!
//! Every catalog route sits behind the bearer-token gate in [`middleware`].

pub mod error;
pub mod images;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
