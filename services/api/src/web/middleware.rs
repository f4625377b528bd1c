//! services/api/src/web/middleware.rs
//!
//! Extracts the caller's claimed identity from each request.

use axum::{
    extract::{Query, Request},
    http::{HeaderMap, Uri},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use tracing::debug;

pub const ADMIN_HEADER: &str = "x-admin-uid";
pub const ADMIN_QUERY_PARAM: &str = "admin_uid";

/// The identity the caller claims, as handed over by the identity provider.
///
/// It is only a claim: handlers pass it through the admin gate, which checks it
/// against the user store on every request.
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<String>);

impl Caller {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Middleware that reads the caller identity from the `x-admin-uid` header, or
/// failing that the `admin_uid` query parameter, and inserts it into the request
/// extensions for handlers to use.
///
/// It never rejects: an absent identity fails the admin gate inside the handler,
/// which answers 403.
pub async fn extract_caller(mut req: Request, next: Next) -> Response {
    let caller = caller_from_request(req.headers(), req.uri());
    debug!(caller = ?caller.as_deref(), path = %req.uri().path(), "Caller identity");
    req.extensions_mut().insert(caller);
    next.run(req).await
}

fn caller_from_request(headers: &HeaderMap, uri: &Uri) -> Caller {
    let from_header = headers
        .get(ADMIN_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(non_blank);

    let from_query = || {
        Query::<HashMap<String, String>>::try_from_uri(uri)
            .ok()
            .and_then(|Query(params)| params.get(ADMIN_QUERY_PARAM).and_then(|v| non_blank(v)))
    };

    Caller(from_header.or_else(from_query))
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
