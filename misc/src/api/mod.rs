pub mod pet;
pub mod role;
pub mod user;

use std::collections::HashMap;
use std::fmt::Display;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const HEALTHZ_PATH: &str = "/v1/healthz";
pub const GET_TOKEN_PATH: &str = "/v1/token";
pub const WHOAMI_PATH: &str = "/v1/whoami";
pub const USER_PATH: &str = "/v1/user";
pub const ROLE_PATH: &str = "/v1/role";
pub const PET_PATH: &str = "/v1/pet";

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const MIME_JSON: &str = "application/json";

#[macro_export]
macro_rules! parse_from_map {
    ($fields:expr,$field:expr) => {
        match $fields.get($field) {
            Some(value) => match value.parse() {
                Ok(value) => Some(value),
                Err(_) => anyhow::bail!(format!("{} is invalid", $field)),
            },
            None => None,
        }
    };
}

/// Scalar value used to carry request fields into the storage layer.
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Integer(u64),
    Bool(bool),
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(text) => write!(f, "{text}"),
            Value::Integer(integer) => write!(f, "{integer}"),
            Value::Bool(boolean) => write!(f, "{boolean}"),
        }
    }
}

/// A request that can be completed from url query fields.
pub trait Request: Default {
    fn complete(&mut self, _fields: HashMap<String, String>) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyRequest;

impl Request for EmptyRequest {}

#[derive(Debug, Default, PartialEq, Clone)]
pub struct QueryRequest {
    pub offset: Option<u64>,
    pub limit: Option<u64>,

    pub search: Option<String>,

    pub update_after: Option<u64>,
    pub update_before: Option<u64>,
}

const DEFAULT_LIMIT: u64 = 10;

impl Request for QueryRequest {
    fn complete(&mut self, mut fields: HashMap<String, String>) -> Result<()> {
        self.offset = parse_from_map!(fields, "offset");
        self.limit = parse_from_map!(fields, "limit");
        if self.limit.is_none() {
            self.limit = Some(DEFAULT_LIMIT);
        }
        self.search = fields.remove("search");
        self.update_after = parse_from_map!(fields, "update_after");
        self.update_before = parse_from_map!(fields, "update_before");

        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
pub struct Response<T: Serialize + DeserializeOwned> {
    pub code: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub const STATUS_OK: u32 = 200;
pub const STATUS_BAD_REQUEST: u32 = 400;
pub const STATUS_UNAUTHORIZED: u32 = 401;
pub const STATUS_FORBIDDEN: u32 = 403;
pub const STATUS_NOT_FOUND: u32 = 404;
pub const STATUS_METHOD_NOT_ALLOWED: u32 = 405;
pub const STATUS_INTERNAL_SERVER_ERROR: u32 = 500;

impl<T: Serialize + DeserializeOwned> Response<T> {
    pub fn ok() -> Self {
        Self {
            code: STATUS_OK,
            message: None,
            data: None,
        }
    }

    pub fn with_data(data: T) -> Self {
        Self {
            code: STATUS_OK,
            message: None,
            data: Some(data),
        }
    }

    pub fn bad_request(message: impl ToString) -> Self {
        Self {
            code: STATUS_BAD_REQUEST,
            message: Some(message.to_string()),
            data: None,
        }
    }

    pub fn unauthorized(message: impl ToString) -> Self {
        Self {
            code: STATUS_UNAUTHORIZED,
            message: Some(message.to_string()),
            data: None,
        }
    }

    pub fn forbidden() -> Self {
        Self {
            code: STATUS_FORBIDDEN,
            message: Some(String::from("Operation not allowed")),
            data: None,
        }
    }

    pub fn not_found(message: impl ToString) -> Self {
        Self {
            code: STATUS_NOT_FOUND,
            message: Some(message.to_string()),
            data: None,
        }
    }

    pub fn resource_not_found() -> Self {
        Self::not_found("Resource not found")
    }

    pub fn method_not_allowed() -> Self {
        Self {
            code: STATUS_METHOD_NOT_ALLOWED,
            message: Some(String::from("Method not allowed")),
            data: None,
        }
    }

    pub fn internal_server_error(message: impl ToString) -> Self {
        Self {
            code: STATUS_INTERNAL_SERVER_ERROR,
            message: Some(message.to_string()),
            data: None,
        }
    }

    pub fn database_error() -> Self {
        Self::internal_server_error("Database error")
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
pub struct ListResponse<T: Serialize + DeserializeOwned> {
    pub items: Vec<T>,
    pub total: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub version: String,
    pub timestamp: u64,
}
