use crate::error::AuthError;
use crate::startup::AppState;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

pub const AUTH_COOKIE_NAME: &str = "auth-token";
pub const ADMIN_ROLE: &str = "admin";

const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// HS256 signing material derived from the configured secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &[u8]) -> Self {
        JwtKeys {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn issue_token(&self, user_id: &str, email: &str, role: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| AuthError::TokenCreation)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme != "Bearer" || token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token.to_string())
}

async fn request_token<S: Send + Sync>(parts: &mut Parts, state: &S) -> Option<String> {
    let from_cookie = match Cookies::from_request_parts(parts, state).await {
        Ok(cookies) => cookies
            .get(AUTH_COOKIE_NAME)
            .map(|cookie| cookie.value().to_string()),
        Err(_) => None,
    };

    from_cookie.or_else(|| bearer_token(&parts.headers))
}

/// Any caller holding a valid token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

/// A caller whose token carries the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = parts
            .extensions
            .get::<AppState>()
            .cloned()
            .ok_or(AuthError::MissingState)?;

        let token = request_token(parts, state)
            .await
            .ok_or(AuthError::MissingToken)?;

        let claims = app_state.jwt.verify_token(&token)?;
        Ok(AuthUser(claims))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_admin() {
            warn!(user_id = %claims.user_id, role = %claims.role, "admin route refused");
            return Err(AuthError::Forbidden);
        }
        Ok(AdminUser(claims))
    }
}
