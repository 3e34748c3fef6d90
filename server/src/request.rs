use std::collections::HashMap;

use actix_web::web::Bytes;
use actix_web::HttpRequest;
use anyhow::{Context, Result};
use log::debug;
use pawmart_misc::api::Request;
use url::form_urlencoded;

#[macro_export]
macro_rules! parse_request {
    ($req:expr, $body:expr) => {
        match $crate::request::parse_request_raw(&$req, $body) {
            Ok(parsed) => parsed,
            Err(e) => {
                return pawmart_misc::api::Response::bad_request(format!("bad request: {e:#}"))
            }
        }
    };
}

pub fn parse_request_raw<T>(req: &HttpRequest, body: Option<Bytes>) -> Result<T>
where
    T: Request,
{
    let query_string = req.query_string();

    let fields: HashMap<String, String> = form_urlencoded::parse(query_string.as_bytes())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    debug!(
        "- {} {}, fields: {:?}, peer: {:?}, with_body: {:?}",
        req.method(),
        req.path(),
        fields,
        req.peer_addr(),
        body.is_some()
    );

    let mut parsed = T::default();
    parsed.complete(fields).context("parse query")?;

    Ok(parsed)
}
