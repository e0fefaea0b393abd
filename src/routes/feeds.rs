//! # RSS 피드 핸들러
//!
//! - `GET /feed/essays` → 에세이 피드
//! - `GET /feed/log` → 독서 기록 피드
//!
//! 실패하면 XML 대신 일반 텍스트 500을 돌려줍니다.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    db,
    models::{Post, PostType},
    services::rss::{self, Channel, Item},
    state::AppState,
};

/// 피드 하나에 들어가는 최대 항목 수
const FEED_LIMIT: i64 = 50;

pub async fn essays_feed(State(state): State<AppState>) -> Response {
    let site = state.config.site_url.clone();
    render_feed(
        &state,
        PostType::Essay,
        Channel {
            title: format!("{} — Essays", state.config.site_name),
            description: "Long-form essays".to_string(),
            self_url: format!("{site}/feed/essays"),
            site_url: site,
            items: Vec::new(),
        },
        rss::essay_item,
    )
    .await
}

pub async fn log_feed(State(state): State<AppState>) -> Response {
    let site = state.config.site_url.clone();
    render_feed(
        &state,
        PostType::Log,
        Channel {
            title: format!("{} — Reading Log", state.config.site_name),
            description: "Things I've been reading".to_string(),
            self_url: format!("{site}/feed/log"),
            site_url: site,
            items: Vec::new(),
        },
        rss::log_item,
    )
    .await
}

async fn render_feed(
    state: &AppState,
    post_type: PostType,
    mut channel: Channel,
    to_item: fn(&Post, &str) -> Item,
) -> Response {
    let posts = match db::recent_published(&state.pool, post_type, FEED_LIMIT).await {
        Ok(posts) => posts,
        Err(e) => {
            tracing::error!(%post_type, error = %e, "failed to build feed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error generating feed").into_response();
        }
    };

    channel.items = posts
        .iter()
        .map(|post| to_item(post, &state.config.site_url))
        .collect();

    (
        [
            (header::CONTENT_TYPE, "application/xml; charset=utf-8"),
            (header::CACHE_CONTROL, "s-maxage=3600, stale-while-revalidate"),
        ],
        rss::render(&channel, Utc::now()),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use crate::test_support::{body_text, send, test_app};
    use axum::http::{header, Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn feeds_list_published_posts_of_their_type() {
        let app = test_app().await;
        for body in [
            json!({ "type": "ESSAY", "title": "Published essay", "content": "<p>Body</p>" }),
            json!({ "type": "ESSAY", "title": "Draft essay", "status": "DRAFT" }),
            json!({ "type": "LOG", "title": "A link", "url": "https://arxiv.org/abs/1?a=1&b=2" }),
        ] {
            send(&app.router, Method::POST, "/api/posts", app.auth(), Some(body)).await;
        }

        let res = send(&app.router, Method::GET, "/feed/essays", None, None).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/xml; charset=utf-8");
        assert_eq!(res.headers()[header::CACHE_CONTROL], "s-maxage=3600, stale-while-revalidate");
        let xml = body_text(res).await;
        assert!(xml.contains("<title><![CDATA[Test Site — Essays]]></title>"));
        assert!(xml.contains("Published essay"));
        assert!(!xml.contains("Draft essay"));
        assert!(!xml.contains("A link"));

        let xml = body_text(send(&app.router, Method::GET, "/feed/log", None, None).await).await;
        assert!(xml.contains("<link>https://arxiv.org/abs/1?a=1&amp;b=2</link>"));
        assert!(xml.contains(r#"isPermaLink="false""#));
        assert!(xml.contains("https://site.test/feed/log"));
    }
}
