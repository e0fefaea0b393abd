//! 공통 레이아웃과 CSS

use chrono::DateTime;
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::{middleware::auth::Viewer, state::AppState};

pub const PAGE_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
:root{--bg:#fbfaf7;--fg:#1d1d1b;--fg2:#5a5a55;--fg3:#9a9a92;--accent:#b4451f;--line:#e6e3dc;--mono:ui-monospace,Menlo,monospace}
body{font-family:Georgia,"Iowan Old Style",serif;line-height:1.6;color:var(--fg);background:var(--bg);padding:1.5rem 1rem}
a{color:var(--accent);text-decoration:none}
a:hover{text-decoration:underline}
img{max-width:100%;height:auto}
.wrap{max-width:960px;margin:0 auto}
header.site{display:flex;justify-content:space-between;align-items:baseline;gap:1rem;border-bottom:1px solid var(--line);padding-bottom:.75rem;margin-bottom:1.5rem}
header.site .brand{font-size:1.4rem;font-weight:700;color:var(--fg)}
header.site nav{display:flex;gap:1rem;align-items:baseline;font-size:.95rem}
header.site form{display:inline}
button,.button{font:inherit;font-size:.9rem;padding:.3rem .8rem;border:1px solid var(--line);background:#fff;border-radius:4px;cursor:pointer;color:var(--fg)}
button.danger{color:#a11}
button.link{border:none;background:none;padding:0;color:var(--accent)}
.layout{display:grid;grid-template-columns:1fr 220px;gap:2rem}
@media(max-width:760px){.layout{grid-template-columns:1fr}}
.tabs{display:flex;gap:1rem;margin-bottom:1rem}
.tabs a.active{font-weight:700;color:var(--fg)}
.search{margin-bottom:1.5rem}
.search input{font:inherit;padding:.35rem .6rem;width:100%;max-width:360px;border:1px solid var(--line);border-radius:4px}
.entry{padding:1rem 0;border-bottom:1px solid var(--line)}
.entry h2{font-size:1.15rem}
.entry .meta{font-size:.85rem;color:var(--fg3);font-family:var(--mono)}
.entry .body{margin-top:.4rem;color:var(--fg2)}
.tags{display:flex;flex-wrap:wrap;gap:.4rem;margin-top:.4rem}
.tag{font-size:.8rem;font-family:var(--mono);background:#f0ede6;padding:.05rem .45rem;border-radius:3px}
.badge{font-size:.75rem;font-family:var(--mono);padding:.05rem .4rem;border-radius:3px;background:#fde8c8}
.pager{display:flex;justify-content:space-between;margin:1.5rem 0}
aside h3{font-size:.95rem;margin-bottom:.5rem}
aside li{list-style:none;font-size:.9rem}
article.post h1{font-size:2rem;line-height:1.2;margin-bottom:.5rem}
article.post .content{margin-top:1.5rem;font-size:1.1rem}
article.post .content p{margin-bottom:1rem}
table{border-collapse:collapse;width:100%}
td,th{padding:.45rem .5rem;border-bottom:1px solid var(--line);text-align:left;font-size:.95rem}
form.editor label{display:block;margin-top:1rem;font-size:.9rem;color:var(--fg2)}
form.editor input[type=text],form.editor input[type=url],form.editor select,form.editor textarea{font:inherit;width:100%;padding:.4rem .6rem;border:1px solid var(--line);border-radius:4px;background:#fff}
form.editor textarea{min-height:320px;font-family:var(--mono);font-size:.9rem}
.actions{display:flex;gap:.6rem;margin-top:1.25rem;align-items:center}
.status{font-size:.9rem;color:var(--fg3)}
.stats{display:flex;gap:2rem;margin-bottom:1.5rem}
.message{max-width:480px;margin:4rem auto;text-align:center}
.message h1{margin-bottom:.75rem}
footer.site{margin-top:3rem;padding-top:1rem;border-top:1px solid var(--line);font-size:.85rem;color:var(--fg3)}
"#;

/// `2026-10-16T12:00:00.000Z` → `Oct 16, 2026`
pub fn display_date(stored: &str) -> String {
    DateTime::parse_from_rfc3339(stored)
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|_| stored.to_string())
}

fn head(title: &str, with_script: bool) -> Markup {
    html! {
        head {
            meta charset="utf-8";
            meta name="viewport" content="width=device-width, initial-scale=1";
            title { (title) }
            style { (PreEscaped(PAGE_CSS)) }
            @if with_script {
                script src="/static/admin.js" defer {}
            }
        }
    }
}

/// 사이트 헤더/푸터가 있는 전체 페이지
///
/// 관리자가 보고 있으면 관리 메뉴와 `admin.js`를 함께 넣습니다.
pub fn page(state: &AppState, viewer: &Viewer, title: &str, body: Markup) -> Markup {
    let site = &state.config.site_name;
    let full_title = if title.is_empty() {
        site.clone()
    } else {
        format!("{title} · {site}")
    };

    html! {
        (DOCTYPE)
        html lang="en" {
            (head(&full_title, viewer.is_admin()))
            body {
                div.wrap {
                    header.site {
                        a.brand href="/" { (site) }
                        nav {
                            a href="/?type=LOG" { "Log" }
                            a href="/?type=ESSAY" { "Essays" }
                            @if let Some(user) = &viewer.0 {
                                a href="/admin" { "Admin" }
                                a href="/admin/write" { "Write" }
                                form method="post" action="/auth/logout" {
                                    button.link type="submit" title=(user.email) { "Sign out" }
                                }
                            }
                        }
                    }
                    main { (body) }
                    footer.site {
                        "Feeds: "
                        a href="/feed/essays" { "essays" }
                        " · "
                        a href="/feed/log" { "reading log" }
                    }
                }
            }
        }
    }
}

/// 레이아웃 없이 메시지 하나만 보여주는 페이지 (에러, 로그인 거부 등)
pub fn message(title: &str, message: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            (head(title, false))
            body {
                div.message {
                    h1 { (title) }
                    p { (message) }
                    p { a href="/" { "Back home" } }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_stored_dates() {
        assert_eq!(display_date("2026-10-06T12:00:00.000Z"), "Oct 6, 2026");
        assert_eq!(display_date("yesterday"), "yesterday");
    }

    #[test]
    fn message_page_escapes_text() {
        let html = message("Oops", "<script>alert(1)</script>").into_string();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("/static/admin.js"));
    }
}
