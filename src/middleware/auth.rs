//! # 인증 게이트
//!
//! 이 사이트에 로그인할 수 있는 신원은 `ALLOWED_EMAIL` 하나뿐입니다.
//! 세션은 서명된 JWT이며 `session` 쿠키(브라우저) 또는
//! `Authorization: Bearer` 헤더(스크립트)로 전달됩니다.
//!
//! 두 겹으로 검사합니다.
//! - 라우팅 단계: `require_admin_page`(/admin/*, /share → /login 리다이렉트),
//!   `require_admin_api`(/api/upload → 401)
//! - 핸들러 단계: `AuthUser` 추출자 (없으면 401), `Viewer` 추출자 (초안 노출 여부)

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_DAYS: i64 = 30;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // email
    pub name: Option<String>,
    pub picture: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// 로그인한 관리자
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        session_from_headers(&parts.headers, state).ok_or_else(AppError::unauthorized)
    }
}

/// 요청자가 관리자인지 여부. 실패하지 않는 추출자입니다.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<AuthUser>);

impl Viewer {
    pub fn is_admin(&self) -> bool {
        self.0.is_some()
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Viewer(session_from_headers(&parts.headers, state)))
    }
}

/// 헤더에서 세션 토큰을 찾아 검증합니다.
///
/// 토큰 서명이 맞더라도 이메일이 현재 `ALLOWED_EMAIL`과 다르면 거부합니다.
pub fn session_from_headers(headers: &HeaderMap, state: &AppState) -> Option<AuthUser> {
    let token = bearer_token(headers).or_else(|| cookie_value(headers, SESSION_COOKIE))?;
    let claims = verify_session_token(token, &state.config.session_secret).ok()?;

    if !claims.sub.eq_ignore_ascii_case(&state.config.allowed_email) {
        tracing::warn!(email = %claims.sub, "session for non-allowed identity rejected");
        return None;
    }

    Some(AuthUser {
        email: claims.sub,
        name: claims.name,
        image: claims.picture,
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// `Cookie: a=1; session=xyz` 헤더에서 이름이 일치하는 값을 찾습니다.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

pub fn create_session_token(user: &AuthUser, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.email.clone(),
        name: user.name.clone(),
        picture: user.image.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::days(SESSION_DAYS)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_session_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// 세션 쿠키 `Set-Cookie` 값. `max_age_secs`가 0이면 쿠키를 지웁니다.
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// 관리자 화면용 라우팅 게이트: 세션이 없으면 로그인 페이지로 보냅니다.
pub async fn require_admin_page(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if session_from_headers(req.headers(), &state).is_none() {
        return Redirect::to("/login").into_response();
    }
    next.run(req).await
}

/// 보호된 API용 라우팅 게이트: 세션이 없으면 HTTP 메서드와 관계없이 401.
pub async fn require_admin_api(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if session_from_headers(req.headers(), &state).is_none() {
        return AppError::unauthorized().into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn session_token_round_trips_claims() {
        let user = AuthUser {
            email: "me@example.com".into(),
            name: Some("Me".into()),
            image: None,
        };
        let token = create_session_token(&user, "secret").unwrap();
        let claims = verify_session_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "me@example.com");
        assert_eq!(claims.name.as_deref(), Some("Me"));
        assert!(verify_session_token(&token, "other-secret").is_err());
    }

    #[test]
    fn finds_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session=abc.def; x=1"));
        assert_eq!(cookie_value(&headers, "session"), Some("abc.def"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn logout_cookie_expires_immediately() {
        let cookie = session_cookie("", 0, true);
        assert!(cookie.starts_with("session=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.ends_with("; Secure"));
    }
}
