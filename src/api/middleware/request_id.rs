use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Identifier of the request being handled, available as an extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let incoming = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .and_then(|v| HeaderValue::from_str(v).ok().map(|h| (v.to_string(), h)));

    let (request_id, header_value) = match incoming {
        Some(pair) => pair,
        None => {
            let id = Uuid::new_v4().to_string();
            // UUID strings are always valid header values
            let value = HeaderValue::from_str(&id).unwrap_or(HeaderValue::from_static("unknown"));
            (id, value)
        }
    };

    req.headers_mut()
        .insert(REQUEST_ID_HEADER.clone(), header_value.clone());
    req.extensions_mut().insert(RequestId(request_id));

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(REQUEST_ID_HEADER.clone(), header_value);

    response
}
