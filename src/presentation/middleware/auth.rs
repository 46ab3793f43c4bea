//! Authentication Middleware
//!
//! Bearer JWT validation for protected routes. Tokens are issued elsewhere;
//! this server only verifies them and reads the caller's identity.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::application::services::Sender;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Display name shown as message sender
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Authenticated user extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub display_name: String,
}

impl AuthUser {
    /// Identity used as the author of messages.
    pub fn sender(&self) -> Sender {
        Sender {
            id: self.user_id.clone(),
            name: self.display_name.clone(),
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        let display_name = claims
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| claims.sub.clone());
        Self {
            user_id: claims.sub,
            display_name,
        }
    }
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".into()))?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.settings.jwt.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Token expired".into())
        }
        _ => AppError::Unauthorized("Invalid token".into()),
    })?;

    if token_data.claims.sub.trim().is_empty() {
        return Err(AppError::Unauthorized("Invalid token claims".into()));
    }

    let user = AuthUser::from(token_data.claims);
    tracing::debug!(user_id = %user.user_id, "Request authenticated");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(name: Option<&str>) -> Claims {
        Claims {
            sub: "alice".into(),
            name: name.map(str::to_string),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_display_name_from_claims() {
        let user = AuthUser::from(claims(Some("Alice A.")));
        assert_eq!(user.user_id, "alice");
        assert_eq!(user.display_name, "Alice A.");
    }

    #[test]
    fn test_display_name_falls_back_to_user_id() {
        assert_eq!(AuthUser::from(claims(None)).display_name, "alice");
        assert_eq!(AuthUser::from(claims(Some("  "))).display_name, "alice");
    }
}
