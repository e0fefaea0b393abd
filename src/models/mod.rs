//! # 데이터 모델 모듈
//!
//! - `post`: 글, 글 요청/응답, 목록 필터, 통계
//! - `tag`: 태그와 태그 이름 정규화
//! - `user`: 관리자 사용자
//! - `image`: 업로드 이미지 메타데이터
//! - `export`: 전체 내보내기 JSON 구조

pub mod export;
pub mod image;
pub mod post;
pub mod tag;
pub mod user;

pub use export::*;
pub use image::*;
pub use post::*;
pub use tag::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// `Option<Option<T>>` 필드용 역직렬화 함수
///
/// serde 기본 동작은 `null`과 "필드 없음"을 모두 `None`으로 만들기 때문에,
/// `#[serde(default)]`와 함께 써서 `null`을 `Some(None)`으로 구분합니다.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
