//! # 로그인 / 로그아웃
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET | /auth/google | state + PKCE verifier를 쿠키에 넣고 Google로 리다이렉트 |
//! | GET | /auth/google/callback | 코드 교환 → 허용된 이메일이면 세션 쿠키 발급 |
//! | POST | /auth/logout | 세션 쿠키 삭제 |
//! | GET | /api/auth/session | 현재 세션 사용자 (없으면 `null`) |

use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    middleware::auth::{cookie_value, create_session_token, session_cookie, AuthUser, Viewer, SESSION_DAYS},
    pages::message_page,
    services::oauth,
    state::AppState,
};

const STATE_COOKIE: &str = "oauth_state";
const VERIFIER_COOKIE: &str = "oauth_verifier";
/// OAuth 왕복에 허용하는 시간 (초)
const OAUTH_COOKIE_SECS: i64 = 600;

fn secure(state: &AppState) -> bool {
    state.config.site_url.starts_with("https://")
}

fn oauth_cookie(name: &str, value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/auth; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `GET /auth/google`
pub async fn google_login(State(state): State<AppState>) -> impl IntoResponse {
    let nonce = oauth::random_token();
    let verifier = oauth::random_token();
    let location = oauth::authorize_url(
        &state.config.google_client_id,
        &oauth::redirect_uri(&state.config.site_url),
        &nonce,
        &verifier,
    );

    let secure = secure(&state);
    (
        AppendHeaders([
            (SET_COOKIE, oauth_cookie(STATE_COOKIE, &nonce, OAUTH_COOKIE_SECS, secure)),
            (SET_COOKIE, oauth_cookie(VERIFIER_COOKIE, &verifier, OAUTH_COOKIE_SECS, secure)),
        ]),
        Redirect::to(&location),
    )
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// `GET /auth/google/callback`
pub async fn google_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = query.error {
        tracing::warn!(%error, "OAuth provider returned an error");
        return message_page(StatusCode::BAD_REQUEST, "Sign-in cancelled", "Google did not complete the sign-in.");
    }

    let expected = cookie_value(&headers, STATE_COOKIE);
    let verifier = cookie_value(&headers, VERIFIER_COOKIE);
    let (Some(code), Some(returned), Some(expected), Some(verifier)) =
        (query.code.as_deref(), query.state.as_deref(), expected, verifier)
    else {
        return message_page(StatusCode::BAD_REQUEST, "Sign-in failed", "The sign-in request was incomplete or expired.");
    };
    if returned != expected {
        tracing::warn!("OAuth state mismatch");
        return message_page(StatusCode::BAD_REQUEST, "Sign-in failed", "The sign-in request was incomplete or expired.");
    }

    let profile = match oauth::exchange_code(
        &state.http,
        &state.config.google_client_id,
        &state.config.google_client_secret,
        &oauth::redirect_uri(&state.config.site_url),
        code,
        verifier,
    )
    .await
    {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!(error = %e, "OAuth code exchange failed");
            return message_page(StatusCode::BAD_GATEWAY, "Sign-in failed", "Could not reach the identity provider.");
        }
    };

    let email = profile.email.trim().to_lowercase();
    if !profile.email_verified || email != state.config.allowed_email {
        tracing::warn!(%email, "sign-in refused for non-allowed identity");
        return message_page(StatusCode::FORBIDDEN, "Access denied", "This account is not allowed to sign in.");
    }

    let user = AuthUser {
        email,
        name: profile.name,
        image: profile.picture,
    };
    let token = match create_session_token(&user, &state.config.session_secret) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "session token creation failed");
            return message_page(StatusCode::INTERNAL_SERVER_ERROR, "Sign-in failed", "Please try again.");
        }
    };

    tracing::info!(email = %user.email, "signed in");
    let secure = secure(&state);
    (
        AppendHeaders([
            (SET_COOKIE, session_cookie(&token, SESSION_DAYS * 24 * 60 * 60, secure)),
            (SET_COOKIE, oauth_cookie(STATE_COOKIE, "", 0, secure)),
            (SET_COOKIE, oauth_cookie(VERIFIER_COOKIE, "", 0, secure)),
        ]),
        Redirect::to("/admin"),
    )
        .into_response()
}

/// `POST /auth/logout`
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(SET_COOKIE, session_cookie("", 0, secure(&state)))],
        Redirect::to("/"),
    )
}

/// `GET /api/auth/session` → `{ "user": { email, name, image } | null }`
pub async fn session(viewer: Viewer) -> Json<Value> {
    Json(json!({ "user": viewer.0 }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{body_json, send, send_request, test_app, token_for};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };

    #[tokio::test]
    async fn login_redirects_to_google_with_pkce_cookies() {
        let app = test_app().await;
        let res = send(&app.router, Method::GET, "/auth/google", None, None).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        let location = res.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("https://accounts.google.com/"));
        assert!(location.contains("code_challenge_method=S256"));

        let cookies: Vec<_> = res.headers().get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(|c| c.to_str().unwrap().contains("HttpOnly")));
        // https 사이트 주소이므로 Secure가 붙습니다.
        assert!(cookies.iter().all(|c| c.to_str().unwrap().ends_with("; Secure")));
    }

    #[tokio::test]
    async fn callback_rejects_mismatched_state() {
        let app = test_app().await;
        let request = Request::builder()
            .uri("/auth/google/callback?code=abc&state=forged")
            .header(header::COOKIE, "oauth_state=real; oauth_verifier=v")
            .body(Body::empty())
            .unwrap();
        let res = send_request(&app.router, request).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn session_endpoint_reflects_cookie_and_allowed_email() {
        let app = test_app().await;
        let anon = body_json(send(&app.router, Method::GET, "/api/auth/session", None, None).await).await;
        assert!(anon["user"].is_null());

        let request = Request::builder()
            .uri("/api/auth/session")
            .header(header::COOKIE, format!("session={}", app.token))
            .body(Body::empty())
            .unwrap();
        let me = body_json(send_request(&app.router, request).await).await;
        assert_eq!(me["user"]["email"], "me@example.com");

        // 서명은 맞지만 허용되지 않은 이메일의 토큰
        let stranger = token_for("someone@else.test");
        let res = send(&app.router, Method::GET, "/api/auth/session", Some(stranger.as_str()), None).await;
        assert!(body_json(res).await["user"].is_null());
    }

    #[tokio::test]
    async fn logout_clears_session_cookie() {
        let app = test_app().await;
        let res = send(&app.router, Method::POST, "/auth/logout", None, None).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
