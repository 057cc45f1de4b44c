use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{
    dto::auth::Claims,
    error::{AppError, AppResult},
    mappers::LoginMapper,
    models::{Capability, Role},
    state::AppState,
};

/// Whoever is calling into the store. Built from the bearer token on HTTP
/// requests, or directly by in-process callers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Actor {
    pub username: String,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(username: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            name: name.into(),
            role,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role.grants(capability)
    }
}

/// Fails with [`AppError::Unauthorized`] unless `actor`'s role grants
/// `capability`. Denials are logged at warn.
pub fn require_capability(actor: &Actor, capability: Capability) -> Result<(), AppError> {
    if actor.can(capability) {
        return Ok(());
    }
    tracing::warn!(
        actor = %actor.name,
        role = %actor.role,
        capability = capability.as_str(),
        "access denied"
    );
    Err(AppError::unauthorized(actor.name.clone()))
}

pub(crate) fn jwt_secret() -> AppResult<String> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))
}

pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::BadRequest("Invalid or expired token".into()))
}

/// Turns verified token claims into an actor, as long as the login behind
/// them still has an open session.
pub async fn session_actor(state: &AppState, claims: Claims) -> AppResult<Actor> {
    let role = claims
        .role
        .parse::<Role>()
        .map_err(|_| AppError::BadRequest("Invalid role in token".into()))?;

    let open = LoginMapper::new(state)
        .find_by_username(&claims.sub)
        .await?
        .is_some_and(|login| login.active);
    if !open {
        tracing::warn!(username = %claims.sub, "token used after the session ended");
        return Err(AppError::BadRequest("Session has ended, log in again".into()));
    }

    Ok(Actor {
        username: claims.sub,
        name: claims.name,
        role,
    })
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::BadRequest("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::BadRequest("Invalid Authorization scheme".into()))?
            .trim();

        let claims = decode_token(token, &jwt_secret()?)?;
        session_actor(state, claims).await
    }
}
