//! Application state shared across handlers

use chrono::TimeDelta;
use std::sync::Arc;
use store::Store;
use token::TokenMaker;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub token_maker: Arc<dyn TokenMaker>,
    pub access_token_ttl: TimeDelta,
    pub refresh_token_ttl: TimeDelta,
}
