//! # 링크 제목 가져오기
//!
//! 글쓰기 화면에서 URL을 붙여넣으면 `GET /api/title?url=`로 페이지 제목을 채웁니다.
//! 어떤 이유로든 실패하면 호스트 이름, 그것도 안 되면 URL 자체를 제목으로 씁니다.

use axum::{
    extract::{Query, State},
    Json,
};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError, middleware::auth::AuthUser, services::text::{collapse_whitespace, extract_domain}, state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TitleResponse {
    pub title: String,
}

/// HTML 문서의 첫 `<title>` 텍스트 (공백 정리). 비어 있으면 `None`.
pub fn extract_title(html: &str) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let document = Html::parse_document(html);
    let title = document.select(&selector).next()?.text().collect::<String>();
    let title = collapse_whitespace(&title);
    (!title.is_empty()).then_some(title)
}

/// 가져오기에 실패했을 때의 제목: 호스트 이름, 파싱할 수 없으면 URL 그대로
pub fn fallback_title(url: &str) -> String {
    extract_domain(url)
}

async fn fetch_title(http: &reqwest::Client, url: &str) -> Result<Option<String>, reqwest::Error> {
    let html = http.get(url).send().await?.text().await?;
    Ok(extract_title(&html))
}

/// `GET /api/title?url=` → `{ "title": "..." }`
pub async fn fetch_page_title(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<TitleQuery>,
) -> Result<Json<TitleResponse>, AppError> {
    let url = query
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::bad_request("url param required"))?;

    let title = match fetch_title(&state.http, &url).await {
        Ok(Some(title)) => title,
        Ok(None) => fallback_title(&url),
        Err(e) => {
            tracing::debug!(%url, error = %e, "title fetch failed");
            fallback_title(&url)
        }
    };

    Ok(Json(TitleResponse { title }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{body_json, send, test_app};
    use axum::http::{Method, StatusCode};

    #[test]
    fn extracts_and_collapses_title() {
        let html = "<html><head><title>\n  Attention   Is All\nYou Need </title></head></html>";
        assert_eq!(extract_title(html).as_deref(), Some("Attention Is All You Need"));
        assert_eq!(extract_title("<html><title>  </title></html>"), None);
        assert_eq!(extract_title("<p>no title</p>"), None);
    }

    #[test]
    fn falls_back_to_host_then_raw_url() {
        assert_eq!(fallback_title("https://arxiv.org/abs/1"), "arxiv.org");
        assert_eq!(fallback_title("not a url"), "not a url");
    }

    #[tokio::test]
    async fn requires_session_and_url() {
        let app = test_app().await;
        let res = send(&app.router, Method::GET, "/api/title?url=https://a.test", None, None).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = send(&app.router, Method::GET, "/api/title", app.auth(), None).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unreachable_host_falls_back_to_hostname() {
        let app = test_app().await;
        let res = send(&app.router, Method::GET, "/api/title?url=http://127.0.0.1:9/page", app.auth(), None).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["title"], "127.0.0.1");
    }
}
