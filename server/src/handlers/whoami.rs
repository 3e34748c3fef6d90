use pawmart_misc::api::user::WhoamiResponse;
use pawmart_misc::api::{EmptyRequest, Response};

use crate::auth::identity::Identity;
use crate::context::ServerContext;
use crate::register_handlers;

register_handlers!(get_whoami);

async fn get_whoami(
    _req: EmptyRequest,
    op: Identity,
    _sc: &ServerContext,
) -> Response<WhoamiResponse> {
    let admin = op.is_admin();
    let mut roles: Vec<String> = op.roles.into_iter().collect();
    roles.sort();

    Response::with_data(WhoamiResponse {
        name: op.name,
        roles,
        admin,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[tokio::test]
    async fn test_whoami() {
        let sc = ServerContext::new_test();

        let op = Identity::new(
            "alice",
            HashSet::from([String::from("seller"), String::from("customer")]),
        );
        let resp = get_whoami(EmptyRequest, op, &sc).await;
        assert_eq!(resp.code, 200);

        let data = resp.data.unwrap();
        assert_eq!(data.name, "alice");
        assert!(!data.admin);
        // Sorted for stable output.
        assert_eq!(
            data.roles,
            vec![String::from("customer"), String::from("seller")]
        );

        let op = Identity::new("root", HashSet::from([String::from("admin")]));
        let resp = get_whoami(EmptyRequest, op, &sc).await;
        assert!(resp.data.unwrap().admin);
    }
}
