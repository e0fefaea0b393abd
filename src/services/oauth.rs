//! # Google OAuth 2.0 (authorization code + PKCE)
//!
//! 로그인 흐름:
//! 1. `/auth/google` → `state`와 PKCE `code_verifier`를 만들어 쿠키에 넣고 Google로 리다이렉트
//! 2. `/auth/google/callback?code=..&state=..` → 쿠키의 state와 비교한 뒤 `exchange_code`
//! 3. 받은 프로필의 이메일이 `ALLOWED_EMAIL`과 같을 때만 세션 토큰 발급

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand_core::{OsRng, RngCore};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("OAuth request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OAuth provider rejected the request: {0}")]
    Rejected(String),
}

/// Google userinfo 응답 중 필요한 필드
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// 32바이트 난수를 URL-safe base64로 인코딩합니다. (state, code_verifier 용)
pub fn random_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// RFC 7636 S256: `BASE64URL(SHA256(code_verifier))`
pub fn pkce_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

pub fn redirect_uri(site_url: &str) -> String {
    format!("{site_url}/auth/google/callback")
}

pub fn authorize_url(client_id: &str, redirect_uri: &str, state: &str, verifier: &str) -> String {
    let challenge = pkce_challenge(verifier);
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", "openid email profile")
        .append_pair("state", state)
        .append_pair("code_challenge", &challenge)
        .append_pair("code_challenge_method", "S256")
        .append_pair("prompt", "select_account")
        .finish();
    format!("{AUTHORIZE_URL}?{query}")
}

/// 인가 코드를 액세스 토큰으로 바꾸고, 그 토큰으로 사용자 프로필을 가져옵니다.
pub async fn exchange_code(
    http: &reqwest::Client,
    client_id: &str,
    client_secret: &str,
    redirect_uri: &str,
    code: &str,
    verifier: &str,
) -> Result<GoogleProfile, OAuthError> {
    let response = http
        .post(TOKEN_URL)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
            ("code_verifier", verifier),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(OAuthError::Rejected(format!("token endpoint {status}: {body}")));
    }
    let token: TokenResponse = response.json().await?;

    let profile = http
        .get(USERINFO_URL)
        .bearer_auth(&token.access_token)
        .send()
        .await?
        .error_for_status()?
        .json::<GoogleProfile>()
        .await?;

    Ok(profile)
}
