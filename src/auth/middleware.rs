use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{
        HeaderValue, StatusCode, header::AUTHORIZATION, header::WWW_AUTHENTICATE, request::Parts,
    },
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::helpers::{
    TokenValidationError, ValidatedToken, extract_token_from_header, validate_token,
};
use crate::server::AppState;
use crate::types::{Role, Token, User};
use crate::workflow::Session;

/// Extractor that requires any valid authentication
pub struct RequireAuth {
    pub token: Token,
    pub user: User,
}

/// Extractor that requires a studio (admin) user
pub struct RequireAdmin {
    pub token: Token,
    pub user: User,
}

/// Extractor that requires a client user, whatever their onboarding state
pub struct RequireClient {
    pub token: Token,
    pub user: User,
}

/// Extractor for dashboard routes: a client that is approved and has signed a contract
pub struct RequireActiveClient {
    pub user: User,
    pub session: Session,
}

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
    InvalidToken,
    TokenExpired,
    NotAdmin,
    NotClient,
    NotAdmitted,
    InternalError,
}

impl AuthError {
    #[must_use]
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidScheme => (StatusCode::UNAUTHORIZED, "Invalid authorization scheme"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
            AuthError::NotAdmin => (StatusCode::FORBIDDEN, "Admin access required"),
            AuthError::NotClient => (StatusCode::FORBIDDEN, "Client access required"),
            AuthError::NotAdmitted => (
                StatusCode::FORBIDDEN,
                "Dashboard is available once your account is approved and your contract is signed",
            ),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let body = json!({ "data": null, "error": message });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"keyline\""),
            );
        }

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let ValidatedToken { token, user } = extract_and_validate_token(parts, state)?;
        Ok(RequireAuth { token, user })
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let ValidatedToken { token, user } = extract_and_validate_token(parts, state)?;

        if user.role != Role::Admin {
            return Err(AuthError::NotAdmin);
        }

        Ok(RequireAdmin { token, user })
    }
}

impl FromRequestParts<Arc<AppState>> for RequireClient {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let ValidatedToken { token, user } = extract_and_validate_token(parts, state)?;

        if user.role != Role::Client {
            return Err(AuthError::NotClient);
        }

        Ok(RequireClient { token, user })
    }
}

impl FromRequestParts<Arc<AppState>> for RequireActiveClient {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let RequireClient { user, .. } = RequireClient::from_request_parts(parts, state).await?;

        let session =
            Session::load(state.store.as_ref(), &user).map_err(|_| AuthError::InternalError)?;
        if !session.client_view().is_active() {
            return Err(AuthError::NotAdmitted);
        }

        Ok(RequireActiveClient { user, session })
    }
}

fn extract_and_validate_token(
    parts: &Parts,
    state: &Arc<AppState>,
) -> Result<ValidatedToken, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let raw_token = extract_token_from_header(auth_header)
        .map_err(map_validation_error)?
        .ok_or(AuthError::MissingAuth)?;

    validate_token(state.store.as_ref(), &raw_token).map_err(map_validation_error)
}

fn map_validation_error(e: TokenValidationError) -> AuthError {
    match e {
        TokenValidationError::InvalidScheme => AuthError::InvalidScheme,
        TokenValidationError::InvalidToken => AuthError::InvalidToken,
        TokenValidationError::TokenExpired => AuthError::TokenExpired,
        TokenValidationError::InternalError => AuthError::InternalError,
    }
}
