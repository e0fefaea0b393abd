//! # 글(Post) 모델 정의
//!
//! 글은 두 종류입니다.
//! - `LOG`: 외부 링크 + 짧은 메모 (독서 기록)
//! - `ESSAY`: 직접 쓴 긴 글
//!
//! API의 JSON 필드 이름은 camelCase (`contentMarkdown`, `viewCount` ...) 입니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{double_option, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum PostType {
    Log,
    Essay,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Log => "LOG",
            PostType::Essay => "ESSAY",
        }
    }
}

impl FromStr for PostType {
    type Err = ();

    /// 대소문자를 구분하지 않습니다 (`log`, `LOG`, `Log` 모두 허용).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOG" => Ok(PostType::Log),
            "ESSAY" => Ok(PostType::Essay),
            _ => Err(()),
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "DRAFT",
            PostStatus::Published => "PUBLISHED",
        }
    }
}

impl FromStr for PostStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(PostStatus::Draft),
            "PUBLISHED" => Ok(PostStatus::Published),
            _ => Err(()),
        }
    }
}

/// `posts` 테이블 한 행
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub post_type: PostType,
    pub title: String,
    pub url: Option<String>,
    pub domain: Option<String>,
    pub content: Option<String>,
    pub content_markdown: Option<String>,
    pub status: PostStatus,
    pub view_count: i64,
    pub author_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }
}

/// 태그 목록을 포함한 API 응답용 글
#[derive(Debug, Clone, Serialize)]
pub struct PostWithTags {
    #[serde(flatten)]
    pub post: Post,
    pub tags: Vec<Tag>,
}

/// `POST /api/posts` 요청 본문
///
/// `type`과 `status`는 문자열로 받아서 핸들러가 직접 검증합니다.
/// (enum으로 바로 역직렬화하면 잘못된 값이 400 대신 422가 됩니다)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(rename = "type")]
    pub post_type: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
    pub content_markdown: Option<String>,
    pub status: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// `PUT /api/posts/:id` 요청 본문
///
/// - 필드 누락 → `None` (변경 안 함)
/// - `null` → `Some(None)` (값 지우기)
/// - 값 → `Some(Some(v))`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub content: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub content_markdown: Option<Option<String>>,
    pub status: Option<String>,
    /// `null`이면 모든 태그 연결을 제거합니다.
    #[serde(default, deserialize_with = "double_option")]
    pub tags: Option<Option<Vec<String>>>,
}

/// 검증이 끝난 새 글. db 계층은 이 구조체만 받습니다.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub post_type: PostType,
    pub title: String,
    pub url: Option<String>,
    pub domain: Option<String>,
    pub content: Option<String>,
    pub content_markdown: Option<String>,
    pub status: PostStatus,
    pub search_text: String,
    pub author_id: Option<String>,
    pub tags: Vec<String>,
}

/// 검증이 끝난 부분 수정. `None`인 필드는 건드리지 않습니다.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    /// url을 바꾸면 domain도 항상 함께 바뀝니다.
    pub url: Option<(Option<String>, Option<String>)>,
    pub content: Option<Option<String>>,
    pub content_markdown: Option<Option<String>>,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
}

/// 목록 조회 조건
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub post_type: Option<PostType>,
    pub tag: Option<String>,
    /// `None`이면 모든 상태 (로그인한 관리자)
    pub status: Option<PostStatus>,
    /// FTS5 MATCH 식 (`fts_match_expression`의 결과)
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostPage {
    pub posts: Vec<PostWithTags>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopPost {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub post_type: PostType,
    pub view_count: i64,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_views: i64,
    pub top_posts: Vec<TopPost>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_type_parses_case_insensitively() {
        assert_eq!("log".parse::<PostType>(), Ok(PostType::Log));
        assert_eq!(" Essay ".parse::<PostType>(), Ok(PostType::Essay));
        assert!("NOTE".parse::<PostType>().is_err());
    }

    #[test]
    fn update_request_distinguishes_null_from_missing() {
        let req: UpdatePostRequest =
            serde_json::from_str(r#"{ "url": null, "title": "New" }"#).unwrap();
        assert_eq!(req.url, Some(None));
        assert_eq!(req.title, Some(Some("New".to_string())));
        assert!(req.content.is_none());
        assert!(req.tags.is_none());
    }

    #[test]
    fn post_serializes_with_type_field() {
        let post = Post {
            id: "p1".into(),
            post_type: PostType::Log,
            title: "t".into(),
            url: None,
            domain: None,
            content: None,
            content_markdown: None,
            status: PostStatus::Draft,
            view_count: 3,
            author_id: None,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
        };
        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["type"], "LOG");
        assert_eq!(value["status"], "DRAFT");
        assert_eq!(value["viewCount"], 3);
    }
}
