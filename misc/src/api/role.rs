use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::{QueryRequest, Request};

/// The role that grants access to everything.
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Role {
    pub name: String,

    pub update_time: u64,
}

#[derive(Debug, Default, PartialEq)]
pub struct PutRoleRequest {
    pub name: String,
}

impl Request for PutRoleRequest {
    fn complete(&mut self, mut fields: HashMap<String, String>) -> Result<()> {
        self.name = fields.remove("name").unwrap_or_default();
        if self.name.is_empty() {
            bail!("name is required to put role");
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct GetRoleRequest {
    pub name: Option<String>,

    pub query: QueryRequest,
}

impl Request for GetRoleRequest {
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
pub struct DeleteRoleRequest {
    pub name: String,
}

impl Request for DeleteRoleRequest {
    fn complete(&mut self, mut fields: HashMap<String, String>) -> Result<()> {
        self.name = fields.remove("name").unwrap_or_default();
        if self.name.is_empty() {
            bail!("name is required to delete role");
        }
        Ok(())
    }
}
