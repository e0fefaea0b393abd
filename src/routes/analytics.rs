use axum::{extract::State, Json};

use crate::{db, error::AppError, middleware::auth::AuthUser, models::Analytics, state::AppState};

/// `GET /api/analytics` → `{ totalViews, topPosts }`
pub async fn analytics(State(state): State<AppState>, _user: AuthUser) -> Result<Json<Analytics>, AppError> {
    Ok(Json(db::analytics(&state.pool).await?))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{body_json, send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn post_page_views_show_up_in_analytics() {
        let app = test_app().await;
        let res = send(&app.router, Method::GET, "/api/analytics", None, None).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let post = body_json(
            send(&app.router, Method::POST, "/api/posts", app.auth(), Some(json!({ "type": "ESSAY", "title": "Read me" })))
                .await,
        )
        .await;
        let page = format!("/post/{}", post["id"].as_str().unwrap());
        for _ in 0..2 {
            assert_eq!(send(&app.router, Method::GET, &page, None, None).await.status(), StatusCode::OK);
        }

        let stats = body_json(send(&app.router, Method::GET, "/api/analytics", app.auth(), None).await).await;
        assert_eq!(stats["totalViews"], 2);
        assert_eq!(stats["topPosts"][0]["title"], "Read me");
        assert_eq!(stats["topPosts"][0]["viewCount"], 2);
    }
}
