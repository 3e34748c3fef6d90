use std::sync::Arc;

use actix_web::web::Data;
use actix_web::{HttpRequest, HttpResponse};
use chrono::Utc;
use pawmart_misc::api::{HealthResponse, Response};

use crate::context::ServerContext;
use crate::handlers;

/// Liveness probe, the only endpoint that skips authentication.
pub async fn get_healthz_handler(
    _req: HttpRequest,
    _sc: Data<Arc<ServerContext>>,
) -> HttpResponse {
    let now = Utc::now().timestamp() as u64;
    let resp = Response::with_data(HealthResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
    });
    handlers::convert_response(resp)
}
