use actix_web::HttpRequest;
use anyhow::{bail, Context, Result};
use log::error;
use pawmart_misc::api;
use pawmart_misc::code;

use crate::auth::identity::Identity;
use crate::context::ServerContext;

/// Authenticates a login request carrying `Authorization: Basic
/// <name>:<base64 password>`. This is only accepted by the token
/// endpoint, everything else requires a bearer token.
pub fn auth_basic_request(sc: &ServerContext, req: &HttpRequest) -> Result<Identity> {
    let auth_header = match req.headers().get(api::HEADER_AUTHORIZATION) {
        Some(header) => match header.to_str() {
            Ok(s) => s.to_string(),
            Err(_) => bail!("invalid authorization header value"),
        },
        None => bail!("missing authorization"),
    };

    let fields = auth_header.split_whitespace().collect::<Vec<&str>>();
    if fields.len() != 2 {
        bail!("invalid authorization header format");
    }

    if fields[0].to_lowercase() != "basic" {
        bail!("token endpoint requires basic authorization");
    }

    auth_basic(sc, fields[1].to_string())
}

pub fn auth_basic(sc: &ServerContext, auth: String) -> Result<Identity> {
    let fields = auth.split(':').collect::<Vec<&str>>();
    if fields.len() != 2 {
        bail!("basic auth missing password");
    }

    let username = fields[0];
    let password = fields[1];
    let password = code::base64_decode_string(password).context("decode password base64")?;

    let result = sc.db.with_transaction(|tx| {
        if !tx.has_user(username.to_string())? {
            return Ok(None);
        }

        let up = tx.get_user_password(username.to_string())?;
        let password = code::sha256(format!("{password}{}", up.salt));

        if password != up.password {
            return Ok(None);
        }

        let roles = tx.list_user_roles(&up.name)?;
        Ok(Some(Identity::new(up.name, roles.into_iter().collect())))
    });
    let identity = match result {
        Ok(identity) => identity,
        Err(e) => {
            error!("Auth database error: {e:#}");
            bail!("database error");
        }
    };
    match identity {
        Some(identity) => Ok(identity),
        None => bail!("incorrect username or password"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pawmart_misc::api::user::PutUserRequest;

    use crate::db::types::CreateUserParams;

    use super::*;

    #[test]
    fn test_auth_basic() {
        let sc = ServerContext::new_test();
        sc.db
            .with_transaction(|tx| {
                tx.create_user(CreateUserParams {
                    user: PutUserRequest {
                        name: String::from("test_admin"),
                        password: code::sha256("test123test_salt1"), // test123
                    },
                    salt: String::from("test_salt1"),
                    update_time: 50,
                })?;
                tx.create_user_role("test_admin", "admin")?;
                tx.create_user(CreateUserParams {
                    user: PutUserRequest {
                        name: String::from("test_normal"),
                        password: code::sha256("test222test_salt2"), // test222
                    },
                    salt: String::from("test_salt2"),
                    update_time: 50,
                })?;
                tx.create_user_role("test_normal", "customer")?;
                Ok(())
            })
            .unwrap();

        let auth = format!("test_admin:{}", code::base64_encode("test123"));
        let identity = auth_basic(&sc, auth).unwrap();
        assert_eq!(identity.name, "test_admin");
        assert!(identity.is_admin());

        let auth = format!("test_normal:{}", code::base64_encode("test222"));
        let identity = auth_basic(&sc, auth).unwrap();
        assert_eq!(identity.name, "test_normal");
        assert_eq!(identity.roles, HashSet::from([String::from("customer")]));
        assert!(!identity.is_admin());

        let auth = format!("test_normal:{}", code::base64_encode("xxx"));
        assert!(auth_basic(&sc, auth).is_err());

        let auth = format!("test_admin:{}", code::base64_encode(""));
        assert!(auth_basic(&sc, auth).is_err());

        let auth = format!("none:{}", code::base64_encode("test123"));
        assert!(auth_basic(&sc, auth).is_err());

        let auth = String::from("test_admin");
        assert!(auth_basic(&sc, auth).is_err());
    }
}
