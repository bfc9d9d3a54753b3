//! Bearer-token gate for protected routes
//!
//! Requests must carry `authorization: <scheme> <token>` where the scheme is
//! `bearer` in any letter case. A verified token's [`Payload`] is attached to
//! the request extensions; any failure short-circuits with 401.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use token::{Payload, TokenMaker};
use tracing::debug;

use crate::{error::ApiError, state::AppState};

/// Scheme expected in the authorization header, compared case-insensitively
pub const AUTHORIZATION_TYPE_BEARER: &str = "bearer";

/// Check an authorization header value and verify its token
pub fn authorize(header: Option<&str>, token_maker: &dyn TokenMaker) -> Result<Payload, ApiError> {
    let header = match header {
        Some(value) if !value.is_empty() => value,
        _ => {
            return Err(ApiError::Unauthorized(
                "authorization header is not provided".to_string(),
            ));
        }
    };

    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(ApiError::Unauthorized(
            "invalid authorization header format".to_string(),
        ));
    }

    let authorization_type = fields[0].to_lowercase();
    if authorization_type != AUTHORIZATION_TYPE_BEARER {
        return Err(ApiError::Unauthorized(format!(
            "unsupported authorization type {}",
            authorization_type
        )));
    }

    token_maker.verify_token(fields[1]).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        ApiError::Unauthorized(e.to_string())
    })
}

/// Reject the request unless it carries a valid bearer token
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let header = match req.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| {
            ApiError::Unauthorized("invalid authorization header format".to_string())
        })?),
        None => None,
    };

    let payload = authorize(header, state.token_maker.as_ref())?;

    // Add the verified payload to request extensions for use in handlers
    req.extensions_mut().insert(payload);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use token::{JwtMaker, TokenError};

    fn maker() -> JwtMaker {
        JwtMaker::new("abcdefghijklmnopqrstuvwxyz012345").unwrap()
    }

    fn message(result: Result<Payload, ApiError>) -> String {
        match result {
            Err(ApiError::Unauthorized(msg)) => msg,
            other => panic!("expected unauthorized, got {:?}", other.map(|p| p.subject)),
        }
    }

    #[test]
    fn accepts_bearer_in_any_case() {
        let maker = maker();
        let (token, _) = maker.create_token("u1", TimeDelta::minutes(1)).unwrap();

        for scheme in ["Bearer", "bearer", "BEARER"] {
            let header = format!("{} {}", scheme, token);
            let payload = authorize(Some(&header), &maker).unwrap();
            assert_eq!(payload.subject, "u1");
        }
    }

    #[test]
    fn missing_header_is_rejected() {
        let maker = maker();
        assert_eq!(
            message(authorize(None, &maker)),
            "authorization header is not provided"
        );
        assert_eq!(
            message(authorize(Some(""), &maker)),
            "authorization header is not provided"
        );
    }

    #[test]
    fn single_field_is_rejected() {
        assert_eq!(
            message(authorize(Some("Bearer"), &maker())),
            "invalid authorization header format"
        );
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert_eq!(
            message(authorize(Some("Basic dXNlcjpwYXNz"), &maker())),
            "unsupported authorization type basic"
        );
    }

    #[test]
    fn verification_failures_carry_reason() {
        let maker = maker();
        let (expired, _) = maker.create_token("u1", TimeDelta::minutes(-1)).unwrap();

        assert_eq!(
            message(authorize(Some(&format!("Bearer {}", expired)), &maker)),
            TokenError::ExpiredToken.to_string()
        );
        assert_eq!(
            message(authorize(Some("Bearer not.a.token"), &maker)),
            TokenError::InvalidToken.to_string()
        );
    }
}
