//! # 태그 모델 정의
//!
//! 태그 이름은 항상 소문자 + 앞뒤 공백 제거 상태로 저장됩니다 (`normalize_tag_name`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// 태그 + 연결된 글 수 (`GET /api/tags`, `GET /api/admin/tags`)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TagWithCount {
    pub id: String,
    pub name: String,
    pub count: i64,
}

/// 자동완성 결과 항목
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TagSuggestion {
    pub id: String,
    pub name: String,
}

/// `PUT /api/admin/tags/:id`
#[derive(Debug, Deserialize)]
pub struct RenameTagRequest {
    pub name: Option<String>,
}

/// `POST /api/admin/tags/merge`: source 태그를 target 태그로 합칩니다.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeTagsRequest {
    pub source_id: Option<String>,
    pub target_id: Option<String>,
}

/// 태그 이름 정규화: 앞뒤 공백 제거 + 소문자
pub fn normalize_tag_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// 글에 붙일 태그 목록 정규화
///
/// 정규화 후 빈 이름은 버리고, 중복은 처음 나온 순서를 유지한 채 제거합니다.
pub fn normalize_tag_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = normalize_tag_name(name.as_ref());
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_names_are_trimmed_lowercased_and_deduplicated() {
        let names = normalize_tag_names(&["  AI ", "ai", "", "   ", "Machine Learning"]);
        assert_eq!(names, vec!["ai".to_string(), "machine learning".to_string()]);
    }
}
