use crate::entities::admin_user::Entity as AdminEntity;
use crate::middleware::logging::{to_response, ApiError};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

/// Rejects requests without a valid admin bearer token. On success the
/// decoded [`Claims`] are available to handlers as an extension.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|header| header.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return unauthorized(AuthMiddlewareError::MissingToken),
    };

    let claims = match validate_token(&state.db, &state.secret, token).await {
        Ok(claims) => claims,
        Err(err) => return unauthorized(err),
    };

    req.extensions_mut().insert(claims);
    next.run(req).await
}

fn unauthorized(err: AuthMiddlewareError) -> Response {
    let status = match err {
        AuthMiddlewareError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNAUTHORIZED,
    };
    to_response(
        (
            status,
            Json(json!({
                "error": "Unauthorized"
            })),
        ),
        Err(ApiError::Unauthorized(err.to_string())),
    )
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub admin_id: i32,
    pub username: String,
    pub exp: usize,
}

#[derive(Clone, Debug)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    pub secret: Arc<str>,
}

pub fn generate_token(
    secret: &str,
    admin_id: i32,
    username: String,
) -> Result<String, AuthMiddlewareError> {
    let exp = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or(AuthMiddlewareError::GenerationFail)?
        .timestamp() as usize;

    let claims = Claims {
        admin_id,
        username,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthMiddlewareError::GenerationFail)
}

pub async fn validate_token(
    db: &DatabaseConnection,
    secret: &str,
    token: &str,
) -> Result<Claims, AuthMiddlewareError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthMiddlewareError::ValidationFail)?
    .claims;

    match AdminEntity::find_by_id(claims.admin_id).one(db).await {
        Ok(Some(_)) => Ok(claims),
        Ok(None) => Err(AuthMiddlewareError::InvalidUser),
        Err(_) => Err(AuthMiddlewareError::InternalServerError),
    }
}

#[derive(Error, Debug)]
pub enum AuthMiddlewareError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Admin account no longer exists")]
    InvalidUser,
    #[error("Failed to validate token")]
    ValidationFail,
    #[error("Failed to generate token")]
    GenerationFail,
    #[error("Internal server error")]
    InternalServerError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_token_decodes_with_same_secret() {
        let token = generate_token("top-secret", 3, "admin".into()).unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"top-secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(decoded.claims.admin_id, 3);
        assert_eq!(decoded.claims.username, "admin");

        let wrong = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other-secret"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(wrong.is_err());
    }
}
