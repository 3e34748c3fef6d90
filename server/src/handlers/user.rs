use chrono::Utc;
use log::{debug, error};
use pawmart_misc::api::user::{
    DeleteUserRequest, GetUserRequest, PatchUserRequest, PutUserRequest, User, ADMIN_USER,
};
use pawmart_misc::api::{ListResponse, Response};
use pawmart_misc::code;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

use crate::auth::identity::Identity;
use crate::context::ServerContext;
use crate::db::types::CreateUserParams;
use crate::{register_admin_handlers, register_handlers};

register_admin_handlers!(put_user);
register_handlers!(get_user, patch_user, delete_user);

async fn put_user(mut req: PutUserRequest, _op: Identity, sc: &ServerContext) -> Response<()> {
    debug!("Create user: {}", req.name);

    let result = sc.db.with_transaction(|tx| {
        if tx.has_user(req.name.clone())? {
            return Ok(false);
        }

        let salt = generate_salt(sc.cfg.salt_length);
        req.password = code::sha256(format!("{}{}", req.password, salt));

        let now = Utc::now().timestamp() as u64;

        tx.create_user(CreateUserParams {
            user: req,
            salt,
            update_time: now,
        })?;
        Ok(true)
    });

    match result {
        Ok(true) => Response::ok(),
        Ok(false) => Response::bad_request("user already exists"),
        Err(e) => {
            error!("Failed to create user: {e:#}");
            Response::database_error()
        }
    }
}

async fn get_user(
    req: GetUserRequest,
    op: Identity,
    sc: &ServerContext,
) -> Response<ListResponse<User>> {
    if !op.is_admin() {
        match req.name {
            Some(ref name) => {
                if !op.can_access_owned(name) {
                    return Response::forbidden();
                }
            }
            None => {
                // Listing all users is admin only.
                return Response::forbidden();
            }
        }
    }
    debug!("Get users: {req:?}");

    let result = sc.db.with_transaction(|tx| {
        let total = tx.count_users(req.clone())?;
        let users = tx.get_users(req)?;
        Ok(ListResponse {
            total,
            items: users,
        })
    });

    match result {
        Ok(users) => Response::with_data(users),
        Err(e) => {
            error!("Failed to get users: {e:#}");
            Response::database_error()
        }
    }
}

async fn patch_user(req: PatchUserRequest, op: Identity, sc: &ServerContext) -> Response<()> {
    if !op.can_access_owned(&req.name) {
        return Response::forbidden();
    }
    if req.roles.is_some() && !op.is_admin() {
        // Nobody grants themselves roles.
        return Response::forbidden();
    }

    debug!("Patch user: {req:?}");

    let result = sc.db.with_transaction(|tx| {
        if !tx.has_user(req.name.clone())? {
            return Ok(Response::resource_not_found());
        }

        if let Some(ref roles) = req.roles {
            for role in roles {
                if !tx.is_role_exists(role)? {
                    return Ok(Response::bad_request(format!("role '{role}' not found")));
                }
            }
        }

        let now = Utc::now().timestamp() as u64;

        if let Some(ref password) = req.password {
            let up = tx.get_user_password(req.name.clone())?;
            let password = code::sha256(format!("{password}{}", up.salt));
            tx.update_user_password(&req.name, &password, now)?;
        }

        if let Some(ref roles) = req.roles {
            tx.delete_user_roles(&req.name)?;
            for role in roles {
                tx.create_user_role(&req.name, role)?;
            }
        }

        Ok(Response::ok())
    });

    match result {
        Ok(resp) => resp,
        Err(e) => {
            error!("Failed to patch user: {e:#}");
            Response::database_error()
        }
    }
}

async fn delete_user(req: DeleteUserRequest, op: Identity, sc: &ServerContext) -> Response<()> {
    if !op.can_access_owned(&req.name) {
        return Response::forbidden();
    }
    if req.name == ADMIN_USER {
        return Response::bad_request("cannot delete the admin account");
    }

    debug!("Delete user: {req:?}");

    let result = sc.db.with_transaction(|tx| {
        if !tx.has_user(req.name.clone())? {
            return Ok(false);
        }
        tx.delete_user_roles(&req.name)?;
        tx.delete_user(&req.name)?;

        let deleted = tx.delete_pets_by_owner(&req.name)?;
        if deleted > 0 {
            debug!("Deleted {deleted} pets belonging to user {}", req.name);
        }

        Ok(true)
    });

    match result {
        Ok(true) => Response::ok(),
        Ok(false) => Response::resource_not_found(),
        Err(e) => {
            error!("Failed to delete user: {e:#}");
            Response::database_error()
        }
    }
}

pub(crate) fn generate_salt(length: usize) -> String {
    let mut rng = thread_rng();

    (0..length)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect()
}
