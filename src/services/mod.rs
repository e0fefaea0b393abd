//! # 서비스 모듈
//!
//! DB나 HTTP에 의존하지 않는 순수 함수들입니다.
//! - `text`: 도메인 추출, HTML 태그 제거, 읽기 시간, 업로드 파일명 정리
//! - `search`: 검색어 정리와 FTS5 MATCH 식 생성
//! - `rss`: RSS 2.0 XML 생성
//! - `oauth`: Google OAuth 요청/응답 처리

pub mod oauth;
pub mod rss;
pub mod search;
pub mod text;
