use actix_web::HttpResponse;
use pawmart_misc::api::{self, Response};
use serde::{de::DeserializeOwned, Serialize};

pub mod healthz;
pub mod pet;
pub mod role;
pub mod token;
pub mod user;
pub mod whoami;

#[macro_export]
macro_rules! register_handlers {
    ($handler:ident) => {
        paste::paste! {
            pub async fn [< $handler _handler >](
                req: actix_web::HttpRequest,
                body: Option<actix_web::web::Bytes>,
                sc: actix_web::web::Data<std::sync::Arc<$crate::context::ServerContext>>,
            ) -> actix_web::HttpResponse {
                let f = || async move {
                    let identity = $crate::auth_request!(sc.as_ref(), req);
                    let req = $crate::parse_request!(req, body);
                    $handler(req, identity, sc.as_ref()).await
                };
                let resp = f().await;
                $crate::handlers::convert_response(resp)
            }
        }
    };

    ($handler:ident, $($rest:ident),* $(,)?) => {
        $crate::register_handlers!($handler);
        $crate::register_handlers!($($rest),*);
    };
}

/// Same as [`register_handlers!`], but rejects callers without the admin
/// role before the request is even parsed.
#[macro_export]
macro_rules! register_admin_handlers {
    ($handler:ident) => {
        paste::paste! {
            pub async fn [< $handler _handler >](
                req: actix_web::HttpRequest,
                body: Option<actix_web::web::Bytes>,
                sc: actix_web::web::Data<std::sync::Arc<$crate::context::ServerContext>>,
            ) -> actix_web::HttpResponse {
                let f = || async move {
                    let identity = $crate::auth_admin_request!(sc.as_ref(), req);
                    let req = $crate::parse_request!(req, body);
                    $handler(req, identity, sc.as_ref()).await
                };
                let resp = f().await;
                $crate::handlers::convert_response(resp)
            }
        }
    };

    ($handler:ident, $($rest:ident),* $(,)?) => {
        $crate::register_admin_handlers!($handler);
        $crate::register_admin_handlers!($($rest),*);
    };
}

pub fn convert_response<T>(resp: Response<T>) -> HttpResponse
where
    T: Serialize + DeserializeOwned,
{
    let mut http_resp = match resp.code {
        api::STATUS_OK => HttpResponse::Ok(),
        api::STATUS_BAD_REQUEST => HttpResponse::BadRequest(),
        api::STATUS_UNAUTHORIZED => HttpResponse::Unauthorized(),
        api::STATUS_FORBIDDEN => HttpResponse::Forbidden(),
        api::STATUS_NOT_FOUND => HttpResponse::NotFound(),
        api::STATUS_METHOD_NOT_ALLOWED => HttpResponse::MethodNotAllowed(),
        _ => HttpResponse::InternalServerError(),
    };
    http_resp.json(resp)
}
