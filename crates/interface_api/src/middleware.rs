//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::auth::Claims;
use crate::AppState;

/// Authentication middleware
///
/// Validates JWT tokens and extracts user claims
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            warn!("Missing or invalid Authorization header");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    match crate::auth::validate_token(token, &state.config.jwt_secret) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(e) => {
            warn!("Token validation failed: {:?}", e);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Extracts the organization from a request's query string
///
/// Settlement routes scope everything by an `org` query parameter; pulling
/// it into the audit line ties each request to the organization it acted on.
fn org_param(query: Option<&str>) -> Option<&str> {
    query?
        .split('&')
        .find_map(|pair| pair.strip_prefix("org="))
        .filter(|v| !v.is_empty())
}

/// Audit logging middleware
///
/// Logs every request with the acting member and, where present, the
/// organization it targeted
pub async fn audit_middleware(
    State(_state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user_id = request
        .extensions()
        .get::<Claims>()
        .map(|c| c.sub.clone())
        .unwrap_or_else(|| "anonymous".to_string());
    let org = org_param(uri.query()).unwrap_or("-").to_string();

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        user = %user_id,
        org = %org,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_param_extracted_from_query() {
        assert_eq!(
            org_param(Some("org=0196b7a0-0000-7000-8000-000000000001&history=true")),
            Some("0196b7a0-0000-7000-8000-000000000001")
        );
        assert_eq!(
            org_param(Some("history=true&org=abc")),
            Some("abc")
        );
    }

    #[test]
    fn test_org_param_absent_or_empty() {
        assert_eq!(org_param(None), None);
        assert_eq!(org_param(Some("history=true")), None);
        assert_eq!(org_param(Some("org=")), None);
    }
}
