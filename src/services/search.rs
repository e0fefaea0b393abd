//! # 검색어 처리
//!
//! 사용자가 입력한 검색어를 FTS5 `MATCH` 식으로 바꾸기 전에 정리합니다.
//! 단어 문자(문자, 숫자, `_`)와 공백 이외의 문자는 모두 공백으로 바뀝니다.
//! 따라서 FTS5 문법 문자(`"`, `*`, `(`, `:` ...)가 쿼리에 섞일 수 없습니다.

/// `"neural nets!!"` → `"neural nets"`
pub fn sanitize_search_term(term: &str) -> String {
    let replaced: String = term
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 정리된 검색어를 FTS5 MATCH 식으로 만듭니다.
///
/// 각 단어를 큰따옴표로 감싸 AND로 묶습니다. (`AND`, `NEAR` 같은 단어도
/// 연산자가 아닌 일반 단어로 검색됩니다.) 남는 단어가 없으면 `None`.
pub fn fts_match_expression(term: &str) -> Option<String> {
    let sanitized = sanitize_search_term(term);
    if sanitized.is_empty() {
        return None;
    }
    Some(
        sanitized
            .split(' ')
            .map(|word| format!("\"{word}\""))
            .collect::<Vec<_>>()
            .join(" "),
    )
}
