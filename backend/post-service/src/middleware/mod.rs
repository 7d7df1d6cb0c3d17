/// HTTP middleware for post-service
///
/// Bearer-token authentication. The middleware itself never rejects a
/// request: it records either the verified principal or the reason the
/// token was refused in the request extensions. Handlers that need a
/// principal take a [`UserId`] argument, and that extractor answers 401.
/// Read endpoints simply don't ask for one.
mod cors;

pub use cors::build_cors;

use crate::domain::UserId;
use crate::error::AppError;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

// =====================================================================
// Token verification
// =====================================================================

/// Shortest accepted HS256 secret, in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// JWT claims issued by the identity service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Verifies HS256 bearer tokens against the shared secret
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Result<Self, AppError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Internal(format!(
                "JWT secret too short: need at least {MIN_SECRET_LEN} bytes"
            )));
        }
        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        })
    }

    /// Validate the token and return its subject as the principal
    pub fn verify(&self, token: &str) -> Result<UserId, AppError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?;

        Uuid::parse_str(&data.claims.sub)
            .map(UserId)
            .map_err(|_| AppError::Unauthorized("Invalid token: malformed user_id".to_string()))
    }
}

/// Why a supplied token was not accepted
#[derive(Debug, Clone)]
struct AuthRejection(String);

enum AuthOutcome {
    Anonymous,
    Authenticated(UserId),
    Rejected(String),
}

fn authenticate(req: &ServiceRequest, verifier: &TokenVerifier) -> AuthOutcome {
    let Some(header) = req.headers().get("Authorization") else {
        return AuthOutcome::Anonymous;
    };
    let Ok(value) = header.to_str() else {
        return AuthOutcome::Rejected("Invalid Authorization header".to_string());
    };
    let Some(token) = value.strip_prefix("Bearer ") else {
        return AuthOutcome::Rejected("Invalid Authorization scheme".to_string());
    };

    match verifier.verify(token.trim()) {
        Ok(user_id) => AuthOutcome::Authenticated(user_id),
        Err(err) => AuthOutcome::Rejected(err.to_string()),
    }
}

// =====================================================================
// Middleware
// =====================================================================

/// Actix middleware that resolves the principal from a Bearer token
#[derive(Clone)]
pub struct JwtAuthMiddleware {
    verifier: Arc<TokenVerifier>,
}

impl JwtAuthMiddleware {
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    verifier: Arc<TokenVerifier>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req, &self.verifier) {
            AuthOutcome::Anonymous => {}
            AuthOutcome::Authenticated(user_id) => {
                req.extensions_mut().insert(user_id);
            }
            AuthOutcome::Rejected(reason) => {
                tracing::warn!(path = %req.path(), "rejected bearer token: {}", reason);
                req.extensions_mut().insert(AuthRejection(reason));
            }
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}

impl FromRequest for UserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let extensions = req.extensions();
        let result = match extensions.get::<UserId>() {
            Some(user_id) => Ok(*user_id),
            None => Err(AppError::Unauthorized(
                extensions
                    .get::<AuthRejection>()
                    .map(|rejection| rejection.0.clone())
                    .unwrap_or_else(|| "Missing Authorization header".to_string()),
            )),
        };
        ready(result)
    }
}
