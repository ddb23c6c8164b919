// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    db::UserStore,
    error::AppError,
    models::user::{Role, User},
    state::AppState,
};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    /// Role at sign-in time. Authorization always uses the role loaded from the store.
    pub role: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs a new JWT for the user.
pub fn sign_jwt(
    id: i64,
    role: Role,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: id.to_string(),
        role: role.as_str().to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// Returns the `Claims` if valid, otherwise returns an `AppError`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// The signed-in user as seen by one request.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: i64,
    pub name: String,
    pub role: Role,
    pub is_expert: bool,
    pub can_manage_content: bool,
    pub can_manage_inquiry: bool,
}

impl Viewer {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Viewer {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            role: user.role,
            is_expert: user.is_expert,
            can_manage_content: user.can_manage_content,
            can_manage_inquiry: user.can_manage_inquiry,
        }
    }
}

/// Per-request session, inserted by `session_middleware` on every route.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub viewer: Option<Viewer>,
}

impl Session {
    pub fn viewer(&self) -> Option<&Viewer> {
        self.viewer.as_ref()
    }

    /// The viewer, or 401 for anonymous requests.
    pub fn require(&self) -> Result<&Viewer, AppError> {
        self.viewer
            .as_ref()
            .ok_or_else(|| AppError::AuthError("Login required".to_string()))
    }
}

/// Axum Middleware: Session.
///
/// No `Authorization` header means an anonymous session. A bearer token must be valid
/// and belong to an existing user, otherwise the request is rejected with 401.
/// The user is reloaded so permission changes apply without a new login.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let session = match auth_header {
        None => Session::default(),
        Some(header) => {
            let token = header
                .strip_prefix("Bearer ")
                .ok_or_else(|| AppError::AuthError("Invalid token".to_string()))?;
            let claims = verify_jwt(token, &state.config.jwt_secret)?;
            let user_id: i64 = claims
                .sub
                .parse()
                .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

            let user = state
                .store
                .user_by_id(user_id)
                .await?
                .ok_or_else(|| AppError::AuthError("Account no longer exists".to_string()))?;

            Session {
                viewer: Some(Viewer::from(&user)),
            }
        }
    };

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_token_verifies_with_same_secret() {
        let token = sign_jwt(42, Role::Admin, "secret", 60).unwrap();
        let claims = verify_jwt(&token, "secret").unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, "ADMIN");
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = sign_jwt(1, Role::User, "secret", 60).unwrap();
        assert!(matches!(
            verify_jwt(&token, "other"),
            Err(AppError::AuthError(_))
        ));
    }

    #[test]
    fn anonymous_session_requires_login() {
        assert!(matches!(
            Session::default().require(),
            Err(AppError::AuthError(_))
        ));
    }
}
