use crate::models::{Claims, Identity, Role, ServiceError};
use actix_web::{HttpMessage, HttpRequest};
use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

pub mod join_code;

lazy_static! {
    static ref HTTP_URL: Regex = Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap();
}

pub fn is_http_url(value: &str) -> bool {
    HTTP_URL.is_match(value)
}

// Pull the identity the auth middleware attached to this request
pub fn get_identity_from_request(req: &HttpRequest) -> Result<Identity, ServiceError> {
    req.extensions()
        .get::<Identity>()
        .cloned()
        .ok_or(ServiceError::Unauthorized)
}

pub fn require_role(identity: &Identity, allowed: &[Role]) -> Result<(), ServiceError> {
    if allowed.contains(&identity.role) {
        Ok(())
    } else {
        warn!(
            "⛔ User: {} with role {:?} rejected, needs one of {:?}",
            identity.user_id, identity.role, allowed
        );
        Err(ServiceError::Forbidden)
    }
}

// JWT utility functions
pub mod jwt {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

    // Mint a token for an identity; used by tests and local tooling
    pub fn generate_token(identity: &Identity, secret: &str) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.user_id.clone(),
            name: identity.name.clone(),
            role: identity.role,
            exp: (now + Duration::days(7)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .map_err(|_| ServiceError::InternalServerError)
    }

    // Validate and decode a JWT token
    pub fn decode_token(token: &str, secret: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ServiceError::Unauthorized)
    }

    // Extract JWT from Authorization header
    pub fn extract_token_from_header(auth_header: &str) -> Result<String, ServiceError> {
        if !auth_header.starts_with("Bearer ") {
            return Err(ServiceError::Unauthorized);
        }

        Ok(auth_header.trim_start_matches("Bearer ").to_string())
    }
}

// Middleware for JWT authentication
pub mod auth_middleware {
    use super::*;
    use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
    use actix_web::http::header;
    use actix_web::Error;
    use futures::future::{ok, Ready};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;

    pub struct Authentication {
        secret: Arc<String>,
    }

    impl Authentication {
        pub fn new(secret: impl Into<String>) -> Self {
            Self {
                secret: Arc::new(secret.into()),
            }
        }
    }

    impl<S, B> Transform<S, ServiceRequest> for Authentication
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<B>;
        type Error = Error;
        type Transform = AuthenticationMiddleware<S>;
        type InitError = ();
        type Future = Ready<Result<Self::Transform, Self::InitError>>;

        fn new_transform(&self, service: S) -> Self::Future {
            ok(AuthenticationMiddleware {
                service,
                secret: self.secret.clone(),
            })
        }
    }

    pub struct AuthenticationMiddleware<S> {
        service: S,
        secret: Arc<String>,
    }

    impl<S> AuthenticationMiddleware<S> {
        fn identify(&self, req: &ServiceRequest) -> Result<Identity, ServiceError> {
            let auth_str = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .ok_or(ServiceError::Unauthorized)?;
            let token = jwt::extract_token_from_header(auth_str)?;
            let claims = jwt::decode_token(&token, &self.secret)?;
            Ok(Identity::from(claims))
        }
    }

    impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<B>;
        type Error = Error;
        type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

        forward_ready!(service);

        fn call(&self, req: ServiceRequest) -> Self::Future {
            let identity = match self.identify(&req) {
                Ok(identity) => identity,
                Err(err) => {
                    warn!("🔒 Rejected unauthenticated request to {}", req.path());
                    return Box::pin(async move { Err(Error::from(err)) });
                }
            };

            // Handlers read the caller back out of the request extensions
            req.extensions_mut().insert(identity);
            let fut = self.service.call(req);
            Box::pin(async move { fut.await })
        }
    }
}
