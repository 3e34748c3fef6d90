pub mod basic;
pub mod identity;
pub mod jwt;

use actix_web::HttpRequest;
use anyhow::Result;
use chrono::Utc;
use log::error;
use pawmart_misc::api;
use pawmart_misc::api::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::auth::identity::Identity;
use crate::auth::jwt::{JwtTokenValidator, TokenError};
use crate::context::ServerContext;
use crate::db::Database;

#[macro_export]
macro_rules! auth_request {
    ($sc:expr, $req:expr) => {
        match $crate::auth::auth_request_raw($sc, &$req) {
            Ok(identity) => identity,
            Err(err) => return err.to_response(),
        }
    };
}

#[macro_export]
macro_rules! auth_admin_request {
    ($sc:expr, $req:expr) => {{
        let identity = $crate::auth_request!($sc, $req);
        if !identity.is_admin() {
            return $crate::auth::AuthError::InsufficientPrivilege.to_response();
        }
        identity
    }};
}

/// Why a request was rejected. Everything except missing privilege is an
/// authentication failure and maps to 401; privilege maps to 403.
#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingCredential,

    #[error("invalid authorization header")]
    MalformedCredential,

    #[error("token expired")]
    ExpiredCredential,

    #[error("unknown subject")]
    UnknownSubject,

    #[error("operation not allowed")]
    InsufficientPrivilege,
}

impl AuthError {
    pub fn to_response<T>(&self) -> Response<T>
    where
        T: Serialize + DeserializeOwned,
    {
        match self {
            Self::InsufficientPrivilege => Response::forbidden(),
            _ => Response::unauthorized(self.to_string()),
        }
    }
}

/// Resolves a token subject to a live identity. Kept behind a trait so
/// the gate can be tested without a real database.
pub trait UserLookup {
    fn find_identity(&self, name: &str) -> Result<Option<Identity>>;
}

impl UserLookup for Database {
    fn find_identity(&self, name: &str) -> Result<Option<Identity>> {
        self.with_transaction(|tx| {
            if !tx.has_user(name.to_string())? {
                return Ok(None);
            }

            let roles = tx.list_user_roles(name)?;
            Ok(Some(Identity::new(name, roles.into_iter().collect())))
        })
    }
}

pub fn auth_request_raw(sc: &ServerContext, req: &HttpRequest) -> Result<Identity, AuthError> {
    let now = Utc::now().timestamp() as u64;
    authenticate_request(&sc.jwt_validator, &sc.db, req, now)
}

/// The per-request authorization gate. Extracts the bearer token,
/// validates it, and resolves the subject to a fresh identity.
pub fn authenticate_request(
    validator: &JwtTokenValidator,
    lookup: &dyn UserLookup,
    req: &HttpRequest,
    now: u64,
) -> Result<Identity, AuthError> {
    let auth_header = match req.headers().get(api::HEADER_AUTHORIZATION) {
        Some(header) => match header.to_str() {
            Ok(s) => s.to_string(),
            Err(_) => return Err(AuthError::MalformedCredential),
        },
        None => return Err(AuthError::MissingCredential),
    };

    let fields = auth_header.split_whitespace().collect::<Vec<&str>>();
    if fields.len() != 2 {
        return Err(AuthError::MalformedCredential);
    }

    if fields[0].to_lowercase() != "bearer" {
        return Err(AuthError::MalformedCredential);
    }

    let name = match validator.validate_token(fields[1], now) {
        Ok(name) => name,
        Err(TokenError::Expired) => return Err(AuthError::ExpiredCredential),
        Err(TokenError::Invalid) => return Err(AuthError::MalformedCredential),
    };

    let identity = match lookup.find_identity(&name) {
        Ok(identity) => identity,
        Err(e) => {
            // Hide storage failures from the client; a subject we cannot
            // resolve is treated as unknown.
            error!("Identity lookup error: {e:#}");
            return Err(AuthError::UnknownSubject);
        }
    };

    match identity {
        Some(identity) => Ok(identity),
        None => Err(AuthError::UnknownSubject),
    }
}
