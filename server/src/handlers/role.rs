use chrono::Utc;
use log::{debug, error};
use pawmart_misc::api::role::{
    DeleteRoleRequest, GetRoleRequest, PutRoleRequest, Role, ADMIN_ROLE,
};
use pawmart_misc::api::{ListResponse, Response};

use crate::auth::identity::Identity;
use crate::context::ServerContext;
use crate::register_admin_handlers;

register_admin_handlers!(put_role, get_role, delete_role);

async fn put_role(req: PutRoleRequest, _op: Identity, sc: &ServerContext) -> Response<()> {
    debug!("Create role: {}", req.name);

    let result = sc.db.with_transaction(|tx| {
        let now = Utc::now().timestamp() as u64;
        // Idempotent, an existing role only gets its timestamp refreshed.
        tx.create_role(&req.name, now)?;
        Ok(())
    });

    match result {
        Ok(()) => Response::ok(),
        Err(e) => {
            error!("Failed to create role: {e:#}");
            Response::database_error()
        }
    }
}

async fn get_role(
    req: GetRoleRequest,
    _op: Identity,
    sc: &ServerContext,
) -> Response<ListResponse<Role>> {
    debug!("Get roles: {req:?}");

    let result = sc.db.with_transaction(|tx| {
        let total = tx.count_roles(req.clone())?;
        let roles = tx.get_roles(req)?;
        Ok(ListResponse {
            total,
            items: roles,
        })
    });

    match result {
        Ok(roles) => Response::with_data(roles),
        Err(e) => {
            error!("Failed to get roles: {e:#}");
            Response::database_error()
        }
    }
}

async fn delete_role(req: DeleteRoleRequest, _op: Identity, sc: &ServerContext) -> Response<()> {
    if req.name == ADMIN_ROLE {
        return Response::bad_request("cannot delete the admin role");
    }

    debug!("Delete role: {req:?}");

    let result = sc.db.with_transaction(|tx| {
        if !tx.is_role_exists(&req.name)? {
            return Ok(Response::resource_not_found());
        }

        if tx.is_role_in_use(&req.name)? {
            return Ok(Response::bad_request("role is still assigned to users"));
        }

        tx.delete_role(&req.name)?;
        Ok(Response::ok())
    });

    match result {
        Ok(resp) => resp,
        Err(e) => {
            error!("Failed to delete role: {e:#}");
            Response::database_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn admin() -> Identity {
        Identity::new("root", HashSet::from([String::from("admin")]))
    }

    #[tokio::test]
    async fn test_roles() {
        let sc = ServerContext::new_test();

        let req = PutRoleRequest {
            name: String::from("customer"),
        };
        let resp = put_role(req, admin(), &sc).await;
        assert_eq!(resp.code, 200);

        let req = PutRoleRequest {
            name: String::from("seller"),
        };
        let resp = put_role(req, admin(), &sc).await;
        assert_eq!(resp.code, 200);

        // Re-creating an existing role succeeds and does not duplicate it.
        let req = PutRoleRequest {
            name: String::from("customer"),
        };
        let resp = put_role(req, admin(), &sc).await;
        assert_eq!(resp.code, 200);

        let resp = get_role(GetRoleRequest::default(), admin(), &sc).await;
        assert_eq!(resp.code, 200);
        assert_eq!(resp.data.unwrap().total, 2);

        let req = GetRoleRequest {
            name: Some(String::from("seller")),
            ..Default::default()
        };
        let resp = get_role(req, admin(), &sc).await;
        let list = resp.data.unwrap();
        assert_eq!(list.total, 1);
        assert_eq!(list.items[0].name, "seller");
    }

    #[tokio::test]
    async fn test_delete_role() {
        let sc = ServerContext::new_test();

        let req = PutRoleRequest {
            name: String::from("customer"),
        };
        put_role(req, admin(), &sc).await;

        sc.db
            .with_transaction(|tx| {
                tx.create_user_role("alice", "customer")?;
                Ok(())
            })
            .unwrap();

        // Role still assigned
        let req = DeleteRoleRequest {
            name: String::from("customer"),
        };
        let resp = delete_role(req, admin(), &sc).await;
        assert_eq!(resp.code, 400);

        sc.db
            .with_transaction(|tx| {
                tx.delete_user_roles("alice")?;
                Ok(())
            })
            .unwrap();

        let req = DeleteRoleRequest {
            name: String::from("customer"),
        };
        let resp = delete_role(req, admin(), &sc).await;
        assert_eq!(resp.code, 200);

        // Already gone
        let req = DeleteRoleRequest {
            name: String::from("customer"),
        };
        let resp = delete_role(req, admin(), &sc).await;
        assert_eq!(resp.code, 404);

        // The admin role itself is protected
        let req = DeleteRoleRequest {
            name: String::from(ADMIN_ROLE),
        };
        let resp = delete_role(req, admin(), &sc).await;
        assert_eq!(resp.code, 400);
    }
}
