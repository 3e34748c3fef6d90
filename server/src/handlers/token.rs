use std::sync::Arc;

use actix_web::web::Data;
use actix_web::{HttpRequest, HttpResponse};
use chrono::Utc;
use log::{debug, error};
use pawmart_misc::api::user::TokenResponse;
use pawmart_misc::api::Response;

use crate::auth::basic;
use crate::context::ServerContext;
use crate::handlers;

/// Exchanges basic credentials for a bearer token. This is the only
/// endpoint authenticated by password, so it bypasses the usual
/// register_handlers macro.
pub async fn get_token_handler(
    req: HttpRequest,
    sc: Data<Arc<ServerContext>>,
) -> HttpResponse {
    let resp = get_token(req, sc.as_ref()).await;
    handlers::convert_response(resp)
}

async fn get_token(req: HttpRequest, sc: &ServerContext) -> Response<TokenResponse> {
    let op = match basic::auth_basic_request(sc, &req) {
        Ok(identity) => identity,
        Err(e) => return Response::unauthorized(format!("basic auth failed: {e:#}")),
    };

    debug!("Generate token for user: {}", op.name);
    let now = Utc::now().timestamp() as u64;
    match sc.jwt_generator.generate_token(op.name, now) {
        Ok(token) => {
            debug!("Token generated, expires at {}", token.expire_after);
            Response::with_data(token)
        }
        Err(e) => {
            error!("Failed to generate token: {e:#}");
            Response::internal_server_error("failed to generate token")
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use pawmart_misc::api;
    use pawmart_misc::api::user::PutUserRequest;
    use pawmart_misc::code;

    use crate::db::types::CreateUserParams;

    use super::*;

    #[tokio::test]
    async fn test_get_token() {
        let sc = ServerContext::new_test();
        sc.db
            .with_transaction(|tx| {
                tx.create_user(CreateUserParams {
                    user: PutUserRequest {
                        name: String::from("alice"),
                        password: code::sha256("test123salt"),
                    },
                    salt: String::from("salt"),
                    update_time: 0,
                })?;
                Ok(())
            })
            .unwrap();

        let auth = format!("Basic alice:{}", code::base64_encode("test123"));
        let req = TestRequest::default()
            .insert_header((api::HEADER_AUTHORIZATION, auth))
            .to_http_request();
        let resp = get_token(req, &sc).await;
        assert_eq!(resp.code, 200);

        let token = resp.data.unwrap();
        let now = Utc::now().timestamp() as u64;
        let sub = sc.jwt_validator.validate_token(&token.token, now).unwrap();
        assert_eq!(sub, "alice");

        // Bad password
        let auth = format!("Basic alice:{}", code::base64_encode("wrong"));
        let req = TestRequest::default()
            .insert_header((api::HEADER_AUTHORIZATION, auth))
            .to_http_request();
        let resp = get_token(req, &sc).await;
        assert_eq!(resp.code, 401);

        // Bearer tokens are not accepted here
        let auth = format!("Bearer {}", token.token);
        let req = TestRequest::default()
            .insert_header((api::HEADER_AUTHORIZATION, auth))
            .to_http_request();
        let resp = get_token(req, &sc).await;
        assert_eq!(resp.code, 401);

        // No credentials at all
        let req = TestRequest::default().to_http_request();
        let resp = get_token(req, &sc).await;
        assert_eq!(resp.code, 401);
    }
}
