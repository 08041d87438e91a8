use axum::{
    extract::{Query, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse as _, Response},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::{error::AppError, state::AppState};

/// The authenticated shop for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub shop: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no session token")]
    MissingToken,
    #[error("invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("session token does not name a shop: {0}")]
    BadDestination(String),
}

/// Resolves the shop behind a request.
pub trait SessionAuthenticator: Send + Sync {
    fn authenticate(&self, headers: &HeaderMap, uri: &Uri) -> Result<Session, AuthError>;
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    dest: String,
    iss: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    id_token: Option<String>,
}

/// Verifies App Bridge session tokens: HS256 JWTs signed with the app secret
/// whose `dest` claim is the shop's admin origin.
pub struct SessionTokenAuth {
    key: DecodingKey,
    validation: Validation,
}

impl SessionTokenAuth {
    pub fn new(api_key: &str, api_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[api_key]);
        validation.validate_nbf = true;
        validation.leeway = 5;
        SessionTokenAuth {
            key: DecodingKey::from_secret(api_secret.as_bytes()),
            validation,
        }
    }

    fn token(headers: &HeaderMap, uri: &Uri) -> Option<String> {
        if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
        Query::<TokenQuery>::try_from_uri(uri)
            .ok()
            .and_then(|q| q.0.id_token)
            .filter(|t| !t.is_empty())
    }
}

fn shop_host(origin: &str) -> Result<String, AuthError> {
    let url = url::Url::parse(origin).map_err(|_| AuthError::BadDestination(origin.to_string()))?;
    match url.host_str() {
        Some(host) if host.ends_with(".myshopify.com") => Ok(host.to_string()),
        _ => Err(AuthError::BadDestination(origin.to_string())),
    }
}

impl SessionAuthenticator for SessionTokenAuth {
    fn authenticate(&self, headers: &HeaderMap, uri: &Uri) -> Result<Session, AuthError> {
        let token = Self::token(headers, uri).ok_or(AuthError::MissingToken)?;
        let claims = jsonwebtoken::decode::<SessionClaims>(&token, &self.key, &self.validation)?.claims;

        let shop = shop_host(&claims.dest)?;
        if let Some(iss) = &claims.iss {
            if shop_host(iss)? != shop {
                return Err(AuthError::BadDestination(iss.clone()));
            }
        }
        Ok(Session { shop })
    }
}

/// Every request belongs to one configured shop.
pub struct DevShopAuth {
    shop: String,
}

impl DevShopAuth {
    pub fn new(shop: impl Into<String>) -> Self {
        DevShopAuth { shop: shop.into() }
    }
}

impl SessionAuthenticator for DevShopAuth {
    fn authenticate(&self, _headers: &HeaderMap, _uri: &Uri) -> Result<Session, AuthError> {
        Ok(Session {
            shop: self.shop.clone(),
        })
    }
}

pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.auth.authenticate(request.headers(), request.uri()) {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(err) => {
            warn!(path = %request.uri().path(), error = %err, "rejected request without a valid session");
            AppError::from(err).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    const API_KEY: &str = "client-id";
    const SECRET: &str = "app-secret";

    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    fn token(secret: &str, claims: serde_json::Value) -> String {
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims_for(shop: &str) -> serde_json::Value {
        json!({
            "iss": format!("https://{shop}/admin"),
            "dest": format!("https://{shop}"),
            "aud": API_KEY,
            "sub": "42",
            "exp": now() + 60,
            "nbf": now() - 1,
        })
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
        headers
    }

    #[test]
    fn resolves_shop_from_bearer_token() {
        let auth = SessionTokenAuth::new(API_KEY, SECRET);
        let jwt = token(SECRET, claims_for("demo.myshopify.com"));
        let session = auth
            .authenticate(&bearer(&jwt), &Uri::from_static("/app/dashboard"))
            .unwrap();
        assert_eq!(session.shop, "demo.myshopify.com");
    }

    #[test]
    fn accepts_id_token_query_parameter() {
        let auth = SessionTokenAuth::new(API_KEY, SECRET);
        let jwt = token(SECRET, claims_for("demo.myshopify.com"));
        let uri: Uri = format!("/app/dashboard?embedded=1&id_token={jwt}").parse().unwrap();
        let session = auth.authenticate(&HeaderMap::new(), &uri).unwrap();
        assert_eq!(session.shop, "demo.myshopify.com");
    }

    #[test]
    fn rejects_missing_token() {
        let auth = SessionTokenAuth::new(API_KEY, SECRET);
        let err = auth
            .authenticate(&HeaderMap::new(), &Uri::from_static("/app/dashboard"))
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));
    }

    #[test]
    fn rejects_wrong_signature() {
        let auth = SessionTokenAuth::new(API_KEY, SECRET);
        let jwt = token("other-secret", claims_for("demo.myshopify.com"));
        let err = auth
            .authenticate(&bearer(&jwt), &Uri::from_static("/"))
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn rejects_expired_token() {
        let auth = SessionTokenAuth::new(API_KEY, SECRET);
        let mut claims = claims_for("demo.myshopify.com");
        claims["exp"] = json!(now() - 600);
        let jwt = token(SECRET, claims);
        assert!(auth.authenticate(&bearer(&jwt), &Uri::from_static("/")).is_err());
    }

    #[test]
    fn rejects_foreign_audience() {
        let auth = SessionTokenAuth::new(API_KEY, SECRET);
        let mut claims = claims_for("demo.myshopify.com");
        claims["aud"] = json!("someone-else");
        let jwt = token(SECRET, claims);
        assert!(auth.authenticate(&bearer(&jwt), &Uri::from_static("/")).is_err());
    }

    #[test]
    fn rejects_issuer_from_another_shop() {
        let auth = SessionTokenAuth::new(API_KEY, SECRET);
        let mut claims = claims_for("demo.myshopify.com");
        claims["iss"] = json!("https://other.myshopify.com/admin");
        let jwt = token(SECRET, claims);
        let err = auth
            .authenticate(&bearer(&jwt), &Uri::from_static("/"))
            .unwrap_err();
        assert!(matches!(err, AuthError::BadDestination(_)));
    }

    #[test]
    fn rejects_non_shop_destination() {
        let auth = SessionTokenAuth::new(API_KEY, SECRET);
        let mut claims = claims_for("demo.myshopify.com");
        claims["dest"] = json!("https://evil.example.com");
        claims.as_object_mut().unwrap().remove("iss");
        let jwt = token(SECRET, claims);
        assert!(matches!(
            auth.authenticate(&bearer(&jwt), &Uri::from_static("/")),
            Err(AuthError::BadDestination(_))
        ));
    }

    #[test]
    fn dev_auth_always_yields_configured_shop() {
        let auth = DevShopAuth::new("dev.myshopify.com");
        let session = auth
            .authenticate(&HeaderMap::new(), &Uri::from_static("/"))
            .unwrap();
        assert_eq!(session.shop, "dev.myshopify.com");
    }
}
