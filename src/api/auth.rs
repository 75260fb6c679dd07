use axum::{
    Form, Json,
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{
        HeaderMap,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::error::{ApiError, INVALID_BODY_MESSAGE};
use crate::api::server::AppState;
use crate::db::{NewUser, StoredUser, repo};

/// Username and password lifted from a `Basic` authorization header.
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<StoredUser>, ApiError> {
    let payload = if is_form(request.headers()) {
        let Form(payload) = Form::<NewUser>::from_request(request, &())
            .await
            .map_err(|rejection| {
                debug!("form rejected: {}", rejection.body_text());
                ApiError::Validation(INVALID_BODY_MESSAGE.to_string())
            })?;
        Some(payload)
    } else {
        let body = Bytes::from_request(request, &())
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        decode_json(&body)?
    };

    let payload = payload
        .filter(|p| !p.is_blank())
        .ok_or(ApiError::EmptyBody)?;

    let user = repo::create_user(&state.db, &payload).await?;
    info!(user_id = %user.id, "signup");

    Ok(Json(user))
}

pub async fn signin(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StoredUser>, ApiError> {
    let credentials = basic_credentials(&headers).ok_or(ApiError::InvalidCredentials)?;

    match repo::authenticate(&state.db, &credentials.username, &credentials.password).await? {
        Some(user) => {
            info!(user_id = %user.id, "signin");
            Ok(Json(user))
        }
        None => {
            warn!("rejected signin");
            Err(ApiError::InvalidCredentials)
        }
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// A blank or `null` body decodes to `None`. Decoder details stay in the log.
fn decode_json(body: &[u8]) -> Result<Option<NewUser>, ApiError> {
    if body.trim_ascii().is_empty() {
        return Ok(None);
    }

    serde_json::from_slice::<Option<NewUser>>(body).map_err(|e| {
        debug!("json rejected: {}", e);
        ApiError::Validation(INVALID_BODY_MESSAGE.to_string())
    })
}

/// Parse `Authorization: Basic base64(username:password)`. Anything malformed
/// is treated the same as no header at all.
pub fn basic_credentials(headers: &HeaderMap) -> Option<Credentials> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn auth_header(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn encode(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn test_basic_credentials() {
        let creds = basic_credentials(&auth_header(&encode("khoa:test"))).unwrap();
        assert_eq!(creds.username, "khoa");
        assert_eq!(creds.password, "test");
    }

    #[test]
    fn test_password_keeps_colons() {
        let creds = basic_credentials(&auth_header(&encode("khoa:a:b"))).unwrap();
        assert_eq!(creds.username, "khoa");
        assert_eq!(creds.password, "a:b");
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let header = format!("basic {}", STANDARD.encode("khoa:test"));
        assert!(basic_credentials(&auth_header(&header)).is_some());
    }

    #[test]
    fn test_malformed_headers() {
        assert!(basic_credentials(&HeaderMap::new()).is_none());
        assert!(basic_credentials(&auth_header("Bearer abc")).is_none());
        assert!(basic_credentials(&auth_header("Basic !!!not-base64")).is_none());
        assert!(basic_credentials(&auth_header(&encode("no-colon"))).is_none());
        assert!(basic_credentials(&auth_header("Basic")).is_none());
    }

    #[test]
    fn test_form_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_form(&headers));

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        assert!(is_form(&headers));
    }

    #[test]
    fn test_decode_json_body() {
        let payload = decode_json(br#"{"username":"Darcy","password":"Password"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(payload.username.as_deref(), Some("Darcy"));
        assert!(payload.email.is_none());
        assert!(!payload.is_blank());
    }

    #[test]
    fn test_decode_blank_and_null() {
        assert!(decode_json(b"").unwrap().is_none());
        assert!(decode_json(b"   \n\t").unwrap().is_none());
        assert!(decode_json(b"null").unwrap().is_none());
    }

    #[test]
    fn test_decode_rejects_garbage_with_fixed_message() {
        let bodies: [&[u8]; 3] = [b"not json", b"42", b"{\"username\": 5}"];
        for body in bodies {
            let err = decode_json(body).unwrap_err();
            assert!(matches!(err, ApiError::Validation(ref m) if m == INVALID_BODY_MESSAGE));
        }
    }
}
