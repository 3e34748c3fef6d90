use std::sync::Arc;
use std::time::Duration;

use actix_web::web::{self, Data};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use log::{info, warn};
use openssl::ssl::SslAcceptorBuilder;
use pawmart_misc::api::{self, Response};
use sd_notify::NotifyState;

use crate::context::ServerContext;
use crate::handlers;
use crate::handlers::healthz::get_healthz_handler;
use crate::handlers::pet::{delete_pet_handler, get_pet_handler, patch_pet_handler, put_pet_handler};
use crate::handlers::role::{delete_role_handler, get_role_handler, put_role_handler};
use crate::handlers::token::get_token_handler;
use crate::handlers::user::{
    delete_user_handler, get_user_handler, patch_user_handler, put_user_handler,
};
use crate::handlers::whoami::get_whoami_handler;

pub struct RestfulServer {
    bind: String,

    ssl: Option<SslAcceptorBuilder>,

    ctx: Arc<ServerContext>,

    keep_alive_secs: Option<u64>,
    workers: Option<u64>,
}

impl RestfulServer {
    pub fn new(bind: String, ctx: Arc<ServerContext>) -> Self {
        Self {
            bind,
            ssl: None,
            ctx,
            keep_alive_secs: None,
            workers: None,
        }
    }

    pub fn set_ssl(&mut self, ssl: SslAcceptorBuilder) {
        self.ssl = Some(ssl);
    }

    pub fn set_keep_alive_secs(&mut self, keep_alive_secs: u64) {
        self.keep_alive_secs = Some(keep_alive_secs);
    }

    pub fn set_workers(&mut self, workers: u64) {
        self.workers = Some(workers);
    }

    pub async fn run(mut self) -> Result<()> {
        let ctx = self.ctx.clone();
        let mut srv = HttpServer::new(move || {
            App::new()
                .app_data(Data::new(ctx.clone()))
                .configure(configure_routes)
                .default_service(web::route().to(Self::default_handler))
        });

        if let Some(ssl) = self.ssl.take() {
            info!("Binding to https://{}", self.bind);
            srv = srv.bind_openssl(&self.bind, ssl).context("bind with ssl")?
        } else {
            warn!("Using HTTP (without SSL). THIS IS DANGEROUS, DO NOT USE IN PRODUCTION");
            info!("Binding to http://{}", self.bind);
            srv = srv.bind(&self.bind).context("bind without ssl")?
        };

        if let Some(keep_alive) = self.keep_alive_secs {
            srv = srv.keep_alive(Duration::from_secs(keep_alive));
        }
        if let Some(workers) = self.workers {
            srv = srv.workers(workers as usize);
        }

        sd_notify::notify(true, &[NotifyState::Ready]).context("notify systemd")?;
        info!("Starting restful server");
        srv.run().await.context("run server")?;

        info!("Server stopped by user");
        Ok(())
    }

    async fn default_handler(req: HttpRequest) -> HttpResponse {
        let path = req.uri().path().to_string();

        const KNOWN_PATHS: [&str; 6] = [
            api::HEALTHZ_PATH,
            api::GET_TOKEN_PATH,
            api::WHOAMI_PATH,
            api::USER_PATH,
            api::ROLE_PATH,
            api::PET_PATH,
        ];

        let resp: Response<()> = if KNOWN_PATHS.contains(&path.as_str()) {
            Response::method_not_allowed()
        } else {
            let method = req.method().as_str();
            Response::not_found(format!("No route to {method} {path}"))
        };
        handlers::convert_response(resp)
    }
}

fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(api::HEALTHZ_PATH, web::get().to(get_healthz_handler))
        .route(api::GET_TOKEN_PATH, web::get().to(get_token_handler))
        .route(api::WHOAMI_PATH, web::get().to(get_whoami_handler))
        .route(api::USER_PATH, web::put().to(put_user_handler))
        .route(api::USER_PATH, web::get().to(get_user_handler))
        .route(api::USER_PATH, web::patch().to(patch_user_handler))
        .route(api::USER_PATH, web::delete().to(delete_user_handler))
        .route(api::ROLE_PATH, web::put().to(put_role_handler))
        .route(api::ROLE_PATH, web::get().to(get_role_handler))
        .route(api::ROLE_PATH, web::delete().to(delete_role_handler))
        .route(api::PET_PATH, web::put().to(put_pet_handler))
        .route(api::PET_PATH, web::get().to(get_pet_handler))
        .route(api::PET_PATH, web::patch().to(patch_pet_handler))
        .route(api::PET_PATH, web::delete().to(delete_pet_handler));
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{call_service, init_service, TestRequest};

    use super::*;

    #[actix_web::test]
    async fn test_routes() {
        let ctx = Arc::new(ServerContext::new_test());
        let app = init_service(
            App::new()
                .app_data(Data::new(ctx))
                .configure(configure_routes)
                .default_service(web::route().to(RestfulServer::default_handler)),
        )
        .await;

        // Tokens are fetched with GET; without credentials this reaches
        // the handler and fails authentication, not routing.
        let req = TestRequest::get().uri(api::GET_TOKEN_PATH).to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = TestRequest::post().uri(api::GET_TOKEN_PATH).to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        let req = TestRequest::get().uri(api::HEALTHZ_PATH).to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = TestRequest::get().uri("/v1/nope").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
