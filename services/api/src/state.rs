//! Application state shared across handlers

use std::sync::Arc;
use store::Store;
use token::TokenMaker;

use crate::images::ImageDepot;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub token_maker: Arc<dyn TokenMaker>,
    pub images: ImageDepot,
}
