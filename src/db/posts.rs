//! # 글 데이터베이스 쿼리 모듈
//!
//! 목록 조회는 필터 조합이 많아서 `sqlx::QueryBuilder`로 WHERE 절을 조립합니다.
//! 글 생성/수정은 태그 연결과 함께 하나의 트랜잭션으로 실행됩니다.
//!
//! FTS5 인덱스(`posts_fts`)는 마이그레이션의 트리거가 `title`, `search_text` 변경을
//! 따라가며 갱신하므로 여기서 직접 건드리지 않습니다.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::search::push_match;
use crate::db::tags::{set_post_tags, tags_for_post, tags_for_posts};
use crate::error::AppError;
use crate::models::*;
use crate::services::text::search_text;

const POST_COLUMNS: &str = "p.id, p.type, p.title, p.url, p.domain, p.content, p.content_markdown, \
     p.status, p.view_count, p.author_id, p.created_at, p.updated_at";

/// 통계 화면의 인기 글 개수
const TOP_POSTS_LIMIT: i64 = 10;

/// `PostFilter`를 WHERE 절로 옮깁니다.
fn push_filter<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filter: &'a PostFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some(post_type) = filter.post_type {
        qb.push(" AND p.type = ").push_bind(post_type);
    }
    if let Some(status) = filter.status {
        qb.push(" AND p.status = ").push_bind(status);
    }
    if let Some(tag) = &filter.tag {
        qb.push(
            " AND EXISTS (SELECT 1 FROM post_tags pt JOIN tags t ON t.id = pt.tag_id \
             WHERE pt.post_id = p.id AND t.name = ",
        )
        .push_bind(tag.as_str())
        .push(")");
    }
    if let Some(expression) = &filter.search {
        push_match(qb, expression);
    }
}

/// 조건에 맞는 글을 최신순으로 한 페이지 가져옵니다.
///
/// `page`는 1부터 시작하며, `total`은 페이지와 관계없이 조건에 맞는 전체 글 수입니다.
pub async fn list_posts(
    pool: &SqlitePool,
    filter: &PostFilter,
    page: i64,
    limit: i64,
) -> Result<PostPage, AppError> {
    let offset = page.saturating_sub(1).saturating_mul(limit);

    let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM posts p");
    push_filter(&mut count_query, filter);
    let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

    let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {POST_COLUMNS} FROM posts p"));
    push_filter(&mut query, filter);
    query
        .push(" ORDER BY p.created_at DESC, p.rowid DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let posts = query.build_query_as::<Post>().fetch_all(pool).await?;

    Ok(PostPage {
        posts: attach_tags(pool, posts).await?,
        total,
        page,
        limit,
    })
}

async fn attach_tags(pool: &SqlitePool, posts: Vec<Post>) -> Result<Vec<PostWithTags>, AppError> {
    let ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
    let mut tags: HashMap<String, Vec<Tag>> = tags_for_posts(pool, &ids).await?;

    Ok(posts
        .into_iter()
        .map(|post| {
            let tags = tags.remove(&post.id).unwrap_or_default();
            PostWithTags { post, tags }
        })
        .collect())
}

pub async fn get_post(pool: &SqlitePool, id: &str) -> Result<Option<Post>, AppError> {
    let post = sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(post)
}

pub async fn get_post_with_tags(pool: &SqlitePool, id: &str) -> Result<Option<PostWithTags>, AppError> {
    let Some(post) = get_post(pool, id).await? else {
        return Ok(None);
    };
    let tags = tags_for_post(pool, id).await?;
    Ok(Some(PostWithTags { post, tags }))
}

/// 새 글과 태그 연결을 한 트랜잭션으로 저장합니다.
pub async fn create_post(pool: &SqlitePool, new: &NewPost) -> Result<PostWithTags, AppError> {
    let id = uuid::Uuid::now_v7().to_string();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO posts (id, type, title, url, domain, content, content_markdown,
                           search_text, status, author_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(new.post_type)
    .bind(&new.title)
    .bind(&new.url)
    .bind(&new.domain)
    .bind(&new.content)
    .bind(&new.content_markdown)
    .bind(&new.search_text)
    .bind(new.status)
    .bind(&new.author_id)
    .execute(&mut *tx)
    .await?;

    set_post_tags(&mut tx, &id, &new.tags).await?;
    tx.commit().await?;

    get_post_with_tags(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created post".to_string()))
}

/// 부분 수정. 글이 없으면 `Ok(None)`.
///
/// 본문이나 URL이 바뀌면 `search_text`도 다시 계산되어 검색 인덱스가 따라갑니다.
/// `patch.tags`가 있으면 태그 연결 전체를 그 목록으로 교체합니다.
pub async fn update_post(
    pool: &SqlitePool,
    id: &str,
    patch: &PostPatch,
) -> Result<Option<PostWithTags>, AppError> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(current) = current else {
        return Ok(None);
    };

    let title = patch.title.clone().unwrap_or(current.title);
    let (url, domain) = patch.url.clone().unwrap_or((current.url, current.domain));
    let content = patch.content.clone().unwrap_or(current.content);
    let content_markdown = patch
        .content_markdown
        .clone()
        .unwrap_or(current.content_markdown);
    let status = patch.status.unwrap_or(current.status);
    let search = search_text(content.as_deref(), domain.as_deref());

    sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, url = ?, domain = ?, content = ?, content_markdown = ?,
            search_text = ?, status = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(&title)
    .bind(&url)
    .bind(&domain)
    .bind(&content)
    .bind(&content_markdown)
    .bind(&search)
    .bind(status)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if let Some(tags) = &patch.tags {
        set_post_tags(&mut tx, id, tags).await?;
    }

    tx.commit().await?;
    get_post_with_tags(pool, id).await
}

/// 글을 삭제합니다. 태그 연결은 CASCADE로 지워지고, 이미지는 글과의 연결만 끊깁니다.
pub async fn delete_post(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn increment_view_count(pool: &SqlitePool, id: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// 피드용: 해당 종류의 공개 글을 최신순으로 `limit`개
pub async fn recent_published(
    pool: &SqlitePool,
    post_type: PostType,
    limit: i64,
) -> Result<Vec<Post>, AppError> {
    let posts = sqlx::query_as::<_, Post>(&format!(
        r#"
        SELECT {POST_COLUMNS} FROM posts p
        WHERE p.type = ? AND p.status = 'PUBLISHED'
        ORDER BY p.created_at DESC, p.rowid DESC
        LIMIT ?
        "#
    ))
    .bind(post_type)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(posts)
}

/// 공개 글 기준 총 조회수와 조회수 상위 글
pub async fn analytics(pool: &SqlitePool) -> Result<Analytics, AppError> {
    let total_views: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(view_count), 0) FROM posts WHERE status = 'PUBLISHED'",
    )
    .fetch_one(pool)
    .await?;

    let top_posts = sqlx::query_as::<_, TopPost>(
        r#"
        SELECT id, title, type, view_count, created_at
        FROM posts
        WHERE status = 'PUBLISHED'
        ORDER BY view_count DESC, created_at DESC
        LIMIT ?
        "#,
    )
    .bind(TOP_POSTS_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(Analytics {
        total_views,
        top_posts,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::testing::test_pool;
    use crate::services::text::url_and_domain;

    pub fn new_post(post_type: PostType, status: PostStatus, title: &str) -> NewPost {
        NewPost {
            post_type,
            title: title.to_string(),
            url: None,
            domain: None,
            content: None,
            content_markdown: None,
            status,
            search_text: String::new(),
            author_id: None,
            tags: Vec::new(),
        }
    }

    /// 태그가 붙은 글 하나를 만들고 id를 돌려줍니다.
    pub async fn insert_post(
        pool: &SqlitePool,
        post_type: PostType,
        status: PostStatus,
        tags: &[&str],
    ) -> String {
        let mut new = new_post(post_type, status, "Untitled");
        new.tags = tags.iter().map(|t| t.to_string()).collect();
        create_post(pool, &new).await.unwrap().post.id
    }

    #[tokio::test]
    async fn create_normalizes_and_links_tags() {
        let pool = test_pool().await;
        let mut new = new_post(PostType::Log, PostStatus::Published, "Attention");
        new.tags = vec!["  AI ".into(), "ai".into(), "".into(), "Papers".into()];

        let created = create_post(&pool, &new).await.unwrap();

        let names: Vec<_> = created.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["ai", "papers"]);
        assert_eq!(created.post.view_count, 0);
    }

    #[tokio::test]
    async fn list_filters_by_status_type_and_tag() {
        let pool = test_pool().await;
        insert_post(&pool, PostType::Log, PostStatus::Published, &["ai"]).await;
        insert_post(&pool, PostType::Essay, PostStatus::Published, &["ai"]).await;
        insert_post(&pool, PostType::Log, PostStatus::Draft, &["ai"]).await;

        let published = PostFilter {
            status: Some(PostStatus::Published),
            ..Default::default()
        };
        assert_eq!(list_posts(&pool, &published, 1, 20).await.unwrap().total, 2);

        let everything = PostFilter::default();
        assert_eq!(list_posts(&pool, &everything, 1, 20).await.unwrap().total, 3);

        let logs_tagged_ai = PostFilter {
            post_type: Some(PostType::Log),
            tag: Some("ai".into()),
            status: Some(PostStatus::Published),
            search: None,
        };
        let page = list_posts(&pool, &logs_tagged_ai, 1, 20).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.posts[0].post.post_type, PostType::Log);
        assert_eq!(page.posts[0].tags[0].name, "ai");
    }

    #[tokio::test]
    async fn list_paginates_newest_first() {
        let pool = test_pool().await;
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(insert_post(&pool, PostType::Log, PostStatus::Published, &[]).await);
        }

        let filter = PostFilter::default();
        let first = list_posts(&pool, &filter, 1, 2).await.unwrap();
        let third = list_posts(&pool, &filter, 3, 2).await.unwrap();

        assert_eq!(first.total, 5);
        assert_eq!(first.posts[0].post.id, ids[4]);
        assert_eq!(first.posts[1].post.id, ids[3]);
        assert_eq!(third.posts.len(), 1);
        assert_eq!(third.posts[0].post.id, ids[0]);
    }

    #[tokio::test]
    async fn search_without_hits_matches_nothing() {
        let pool = test_pool().await;
        insert_post(&pool, PostType::Log, PostStatus::Published, &[]).await;

        let filter = PostFilter {
            search: Some("\"zebra\"".into()),
            ..Default::default()
        };
        let page = list_posts(&pool, &filter, 1, 20).await.unwrap();
        assert_eq!(page.total, 0);
        assert!(page.posts.is_empty());
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty_not_an_error() {
        let pool = test_pool().await;
        insert_post(&pool, PostType::Log, PostStatus::Published, &[]).await;

        let page = list_posts(&pool, &PostFilter::default(), i64::MAX, 50).await.unwrap();
        assert_eq!(page.total, 1);
        assert!(page.posts.is_empty());
    }

    #[tokio::test]
    async fn update_replaces_given_fields_only() {
        let pool = test_pool().await;
        let mut new = new_post(PostType::Log, PostStatus::Draft, "Before");
        let (url, domain) = url_and_domain(Some("https://arxiv.org/abs/1".into()));
        new.url = url;
        new.domain = domain;
        new.content = Some("<p>notes</p>".into());
        new.tags = vec!["ai".into(), "papers".into()];
        let id = create_post(&pool, &new).await.unwrap().post.id;

        let patch = PostPatch {
            title: Some("After".into()),
            url: Some(url_and_domain(Some("https://example.com/x".into()))),
            status: Some(PostStatus::Published),
            tags: Some(vec!["rust".into()]),
            ..Default::default()
        };
        let updated = update_post(&pool, &id, &patch).await.unwrap().unwrap();

        assert_eq!(updated.post.title, "After");
        assert_eq!(updated.post.domain.as_deref(), Some("example.com"));
        assert_eq!(updated.post.content.as_deref(), Some("<p>notes</p>"));
        assert!(updated.post.is_published());
        let names: Vec<_> = updated.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["rust"]);
    }

    #[tokio::test]
    async fn update_can_clear_url_and_tags() {
        let pool = test_pool().await;
        let mut new = new_post(PostType::Log, PostStatus::Published, "Link");
        new.url = Some("https://arxiv.org/abs/1".into());
        new.domain = Some("arxiv.org".into());
        new.tags = vec!["ai".into()];
        let id = create_post(&pool, &new).await.unwrap().post.id;

        let patch = PostPatch {
            url: Some((None, None)),
            tags: Some(Vec::new()),
            ..Default::default()
        };
        let updated = update_post(&pool, &id, &patch).await.unwrap().unwrap();

        assert!(updated.post.url.is_none());
        assert!(updated.post.domain.is_none());
        assert!(updated.tags.is_empty());
    }

    #[tokio::test]
    async fn update_missing_post_returns_none() {
        let pool = test_pool().await;
        let patch = PostPatch::default();
        assert!(update_post(&pool, "missing", &patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_post_and_tag_links() {
        let pool = test_pool().await;
        let id = insert_post(&pool, PostType::Log, PostStatus::Published, &["ai"]).await;

        assert!(delete_post(&pool, &id).await.unwrap());
        assert!(!delete_post(&pool, &id).await.unwrap());
        assert!(get_post(&pool, &id).await.unwrap().is_none());

        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post_tags")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(links, 0);
    }

    #[tokio::test]
    async fn analytics_counts_published_views_only() {
        let pool = test_pool().await;
        let popular = insert_post(&pool, PostType::Essay, PostStatus::Published, &[]).await;
        let quiet = insert_post(&pool, PostType::Log, PostStatus::Published, &[]).await;
        let draft = insert_post(&pool, PostType::Essay, PostStatus::Draft, &[]).await;

        for _ in 0..3 {
            increment_view_count(&pool, &popular).await.unwrap();
        }
        increment_view_count(&pool, &quiet).await.unwrap();
        increment_view_count(&pool, &draft).await.unwrap();

        let stats = analytics(&pool).await.unwrap();
        assert_eq!(stats.total_views, 4);
        assert_eq!(stats.top_posts.len(), 2);
        assert_eq!(stats.top_posts[0].id, popular);
        assert_eq!(stats.top_posts[0].view_count, 3);
    }

    #[tokio::test]
    async fn recent_published_skips_drafts_and_other_types() {
        let pool = test_pool().await;
        let essay = insert_post(&pool, PostType::Essay, PostStatus::Published, &[]).await;
        insert_post(&pool, PostType::Essay, PostStatus::Draft, &[]).await;
        insert_post(&pool, PostType::Log, PostStatus::Published, &[]).await;

        let posts = recent_published(&pool, PostType::Essay, 50).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, essay);
    }
}
