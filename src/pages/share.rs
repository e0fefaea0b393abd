//! 공유 화면 (`GET /share?url=..&title=..`)
//!
//! 공유 시트에서 넘어온 링크로 독서 기록 작성 폼을 미리 채웁니다.
//! 제목이 비어 있으면 `admin.js`가 `/api/title`로 채워 넣습니다.

use axum::{
    extract::{Query, State},
    response::Html,
};
use maud::html;
use serde::Deserialize;

use super::{admin::editor_form, layout};
use crate::{middleware::auth::Viewer, models::PostType, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ShareQuery {
    pub url: Option<String>,
    pub title: Option<String>,
}

pub async fn share_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<ShareQuery>,
) -> Html<String> {
    let body = html! {
        h1 { "Save to reading log" }
        (editor_form(None, PostType::Log, query.title.as_deref(), query.url.as_deref()))
    };
    Html(layout::page(&state, &viewer, "Share", body).into_string())
}
