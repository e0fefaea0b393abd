//! # 텍스트 유틸리티
//!
//! 글 저장, 피드 생성, 화면 렌더링에서 공통으로 쓰는 문자열 처리 함수들입니다.

use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static URL_IN_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// 분당 읽는 단어 수
const WORDS_PER_MINUTE: usize = 200;

/// 업로드 파일명에서 원래 이름을 유지하는 최대 글자 수
const MAX_SAFE_NAME_CHARS: usize = 100;

/// URL에서 호스트 이름만 뽑아냅니다.
///
/// `"https://arxiv.org/abs/2301.12345"` → `"arxiv.org"`
///
/// URL로 파싱할 수 없으면 입력을 그대로 돌려줍니다.
pub fn extract_domain(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

/// 빈 문자열 URL은 "URL 없음"으로 취급합니다.
///
/// 반환값: (url, domain). domain은 항상 url에서 계산됩니다.
pub fn url_and_domain(url: Option<String>) -> (Option<String>, Option<String>) {
    match url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
        Some(url) => {
            let domain = extract_domain(&url);
            (Some(url), Some(domain))
        }
        None => (None, None),
    }
}

/// HTML 태그를 제거하고 공백을 하나로 합칩니다.
///
/// 검색 인덱스, RSS 설명, 읽기 시간 계산에 사용됩니다.
/// 자주 쓰이는 엔티티 몇 가지는 원래 문자로 되돌립니다.
pub fn strip_html(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    collapse_whitespace(&text)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 예상 읽기 시간(분). 최소 1분.
pub fn reading_time_minutes(content: Option<&str>) -> usize {
    let words = content
        .map(|c| strip_html(c).split_whitespace().count())
        .unwrap_or(0);
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

/// 앞에서부터 `max_chars` 글자(바이트가 아닌 문자 단위)를 잘라 `…`를 붙입니다.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

/// 글의 검색 인덱스 원본 텍스트 (본문 + 도메인)
pub fn search_text(content: Option<&str>, domain: Option<&str>) -> String {
    let body = content.map(strip_html).unwrap_or_default();
    match domain {
        Some(domain) if !body.is_empty() => format!("{body} {domain}"),
        Some(domain) => domain.to_string(),
        None => body,
    }
}

/// 업로드된 파일 이름을 디스크에 써도 안전한 문자만 남깁니다.
///
/// `[A-Za-z0-9._-]` 이외의 문자는 `_`로 바꾸고 100자까지만 유지합니다.
pub fn safe_upload_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_SAFE_NAME_CHARS)
        .collect()
}

/// 공유 텍스트에서 첫 번째 http(s) URL을 찾습니다.
/// (안드로이드 공유 시트는 URL을 text 필드에 넣는 경우가 많습니다)
pub fn extract_url_from_text(text: &str) -> Option<&str> {
    URL_IN_TEXT_RE.find(text).map(|m| m.as_str())
}
