// Cross-origin middleware: permissive headers on every response, short-circuited pre-flight

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
};

pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type, \
     x-supabase-client-platform, x-supabase-client-platform-version, \
     x-supabase-client-runtime, x-supabase-client-runtime-version";

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}

/// Answers OPTIONS with "ok" without reaching any handler; decorates everything else
pub async fn cors(request: Request, next: Next) -> Response<Body> {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(Body::from("ok"));
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}
