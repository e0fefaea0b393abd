//! 모바일 공유 시트 대상 (`POST /api/share`)
//!
//! 공유된 링크를 `/share` 글쓰기 화면으로 넘깁니다. 안드로이드는 URL을 `text`에
//! 섞어 보내는 경우가 많아서, `url`이 비어 있으면 `text`에서 첫 URL을 찾습니다.

use axum::{response::Redirect, Form};
use serde::Deserialize;

use crate::services::text::extract_url_from_text;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ShareForm {
    pub title: String,
    pub text: String,
    pub url: String,
}

/// 공유 화면 주소 (`/share?url=..&title=..`)
pub fn share_location(form: &ShareForm) -> String {
    let url = Some(form.url.trim())
        .filter(|u| !u.is_empty())
        .or_else(|| extract_url_from_text(&form.text));
    let title = form.title.trim();

    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(url) = url {
        query.append_pair("url", url);
    }
    if !title.is_empty() {
        query.append_pair("title", title);
    }
    let query = query.finish();

    if query.is_empty() {
        "/share".to_string()
    } else {
        format!("/share?{query}")
    }
}

/// `POST /api/share` → 303 See Other
pub async fn share_target(Form(form): Form<ShareForm>) -> Redirect {
    Redirect::to(&share_location(&form))
}
