//! Stateless authenticated tokens for the recipe catalog
//!
//! A token binds a subject identity to an absolute expiry and is protected
//! against tampering by a pre-shared symmetric secret. Verification needs no
//! server-side state: revocation, when wanted, is layered on top by callers.

pub mod error;
pub mod maker;
pub mod payload;

pub use error::TokenError;
pub use maker::{JwtMaker, SYMMETRIC_KEY_LEN, TokenMaker};
pub use payload::Payload;
