use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use rolegrid_core::{ActorIdentity, AppError};

use crate::error::ApiResult;

pub const SUBJECT_HEADER: &str = "x-rolegrid-subject";
pub const DISPLAY_NAME_HEADER: &str = "x-rolegrid-display-name";

pub async fn require_actor(mut request: Request, next: Next) -> ApiResult<Response> {
    let actor = actor_from_headers(request.headers())?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

fn actor_from_headers(headers: &HeaderMap) -> Result<ActorIdentity, AppError> {
    let subject = header_text(headers, SUBJECT_HEADER)
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;
    let display_name = header_text(headers, DISPLAY_NAME_HEADER).unwrap_or(subject);

    Ok(ActorIdentity::new(subject, display_name))
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue};
    use rolegrid_core::AppError;

    use super::{DISPLAY_NAME_HEADER, SUBJECT_HEADER, actor_from_headers};

    #[test]
    fn subject_header_is_required() {
        let mut headers = HeaderMap::new();
        headers.insert(SUBJECT_HEADER, HeaderValue::from_static("  "));

        assert!(matches!(
            actor_from_headers(&headers),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn display_name_defaults_to_subject() {
        let mut headers = HeaderMap::new();
        headers.insert(SUBJECT_HEADER, HeaderValue::from_static("alice"));

        let actor = actor_from_headers(&headers);

        assert!(matches!(actor, Ok(actor) if actor.display_name() == "alice"));
    }

    #[test]
    fn display_name_header_is_used_when_present() {
        let mut headers = HeaderMap::new();
        headers.insert(SUBJECT_HEADER, HeaderValue::from_static("alice"));
        headers.insert(DISPLAY_NAME_HEADER, HeaderValue::from_static("Alice Admin"));

        let actor = actor_from_headers(&headers);

        assert!(matches!(actor, Ok(actor) if actor.subject() == "alice" && actor.display_name() == "Alice Admin"));
    }
}
