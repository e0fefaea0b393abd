//! # 라우트 핸들러 모듈
//!
//! JSON API와 피드, 업로드 파일 서빙을 담당합니다. HTML 화면은 `pages`에 있습니다.
//!
//! 각 하위 모듈:
//! - `analytics`: 조회수 통계
//! - `auth`: Google 로그인, 로그아웃, 세션 조회
//! - `export`: 전체 데이터 내보내기
//! - `feeds`: RSS 피드
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `posts`: 글 CRUD, 목록/검색
//! - `share`: 모바일 공유 대상
//! - `tags`: 태그 목록, 관리, 자동완성
//! - `title`: 링크 제목 가져오기
//! - `upload`: 이미지 업로드와 서빙

pub mod analytics;
pub mod auth;
pub mod export;
pub mod feeds;
pub mod health;
pub mod posts;
pub mod share;
pub mod tags;
pub mod title;
pub mod upload;
