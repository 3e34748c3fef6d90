use std::collections::{HashMap, HashSet};

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{QueryRequest, Request};

/// The reserved account seeded from the server configuration.
pub const ADMIN_USER: &str = "admin";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct User {
    pub name: String,

    /// Roles currently held by this user. Unordered on purpose, role
    /// checks are set membership, never positional.
    pub roles: HashSet<String>,

    pub update_time: u64,
}

#[derive(Debug, Default, PartialEq)]
pub struct PutUserRequest {
    pub name: String,
    pub password: String,
}

impl Request for PutUserRequest {
    fn complete(&mut self, mut fields: HashMap<String, String>) -> Result<()> {
        self.name = fields.remove("name").unwrap_or_default();
        if self.name.is_empty() {
            bail!("name is required to put user");
        }
        if self.name == ADMIN_USER {
            bail!("name cannot be '{ADMIN_USER}'");
        }
        if !is_valid_name(&self.name) {
            bail!("invalid name");
        }

        self.password = fields.remove("password").unwrap_or_default();
        if self.password.is_empty() {
            bail!("password is required to put user");
        }
        Ok(())
    }
}

static NAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").unwrap());

fn is_valid_name(name: &str) -> bool {
    NAME_REGEX.is_match(name)
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct GetUserRequest {
    pub name: Option<String>,

    pub query: QueryRequest,
}

impl Request for GetUserRequest {
    fn complete(&mut self, mut fields: HashMap<String, String>) -> Result<()> {
        self.name = fields.remove("name");
        if self.name.is_some() {
            return Ok(());
        }

        self.query.complete(fields)?;

        Ok(())
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct PatchUserRequest {
    pub name: String,
    pub password: Option<String>,

    /// Full replacement of the user's role set. Admin only.
    pub roles: Option<Vec<String>>,
}

impl Request for PatchUserRequest {
    fn complete(&mut self, mut fields: HashMap<String, String>) -> Result<()> {
        self.name = fields.remove("name").unwrap_or_default();
        if self.name.is_empty() {
            bail!("name is required to patch user");
        }

        self.password = fields.remove("password");
        self.roles = fields.remove("roles").map(|s| {
            s.split(',')
                .map(|role| role.trim().to_string())
                .filter(|role| !role.is_empty())
                .collect()
        });

        if self.password.is_none() && self.roles.is_none() {
            bail!("nothing to patch");
        }

        Ok(())
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct DeleteUserRequest {
    pub name: String,
}

impl Request for DeleteUserRequest {
    fn complete(&mut self, mut fields: HashMap<String, String>) -> Result<()> {
        self.name = fields.remove("name").unwrap_or_default();
        if self.name.is_empty() {
            bail!("name is required to delete user");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub expire_after: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WhoamiResponse {
    pub name: String,
    pub roles: Vec<String>,
    pub admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_put_user_request() {
        let mut req = PutUserRequest::default();
        req.complete(fields(&[("name", "alice"), ("password", "test123")]))
            .unwrap();
        assert_eq!(
            req,
            PutUserRequest {
                name: String::from("alice"),
                password: String::from("test123"),
            }
        );

        let mut req = PutUserRequest::default();
        assert!(req.complete(fields(&[("password", "test123")])).is_err());

        let mut req = PutUserRequest::default();
        assert!(req.complete(fields(&[("name", "alice")])).is_err());

        let mut req = PutUserRequest::default();
        assert!(req
            .complete(fields(&[("name", "admin"), ("password", "test123")]))
            .is_err());

        let mut req = PutUserRequest::default();
        assert!(req
            .complete(fields(&[("name", "bad name!"), ("password", "test123")]))
            .is_err());
    }

    #[test]
    fn test_patch_user_request() {
        let mut req = PatchUserRequest::default();
        req.complete(fields(&[("name", "alice"), ("roles", "admin, customer")]))
            .unwrap();
        assert_eq!(req.name, "alice");
        assert_eq!(
            req.roles,
            Some(vec![String::from("admin"), String::from("customer")])
        );
        assert_eq!(req.password, None);

        // Empty roles value means revoke everything.
        let mut req = PatchUserRequest::default();
        req.complete(fields(&[("name", "alice"), ("roles", "")]))
            .unwrap();
        assert_eq!(req.roles, Some(vec![]));

        let mut req = PatchUserRequest::default();
        assert!(req.complete(fields(&[("name", "alice")])).is_err());

        let mut req = PatchUserRequest::default();
        assert!(req.complete(fields(&[("password", "x")])).is_err());
    }

    #[test]
    fn test_get_user_request() {
        let mut req = GetUserRequest::default();
        req.complete(fields(&[("name", "alice")])).unwrap();
        assert_eq!(req.name, Some(String::from("alice")));

        let mut req = GetUserRequest::default();
        req.complete(fields(&[("limit", "5")])).unwrap();
        assert_eq!(req.name, None);
        assert_eq!(req.query.limit, Some(5));
    }
}
