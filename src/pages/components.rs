//! 여러 화면에서 같이 쓰는 조각들

use maud::{html, Markup, PreEscaped};

use super::layout::display_date;
use crate::models::{PostType, PostWithTags, Tag, TagWithCount};
use crate::services::text::{excerpt, reading_time_minutes, strip_html};

const ESSAY_EXCERPT_CHARS: usize = 280;

pub fn tag_pills(tags: &[Tag]) -> Markup {
    html! {
        @if !tags.is_empty() {
            div.tags {
                @for tag in tags {
                    a.tag href={ "/?tag=" (urlencode(&tag.name)) } { (tag.name) }
                }
            }
        }
    }
}

/// 피드의 글 한 건
///
/// 독서 기록은 외부 링크가 제목이 되고 메모 전체를 보여줍니다.
/// 에세이는 고유 주소로 연결하고 앞부분만 보여줍니다.
pub fn post_entry(entry: &PostWithTags, show_status: bool) -> Markup {
    let post = &entry.post;
    let permalink = format!("/post/{}", post.id);

    html! {
        div.entry {
            @match post.post_type {
                PostType::Log => {
                    h2 {
                        a href=(post.url.as_deref().unwrap_or(&permalink)) { (post.title) }
                    }
                    div.meta {
                        @if let Some(domain) = &post.domain { (domain) " · " }
                        a href=(permalink) { (display_date(&post.created_at)) }
                        @if show_status && !post.is_published() { " " span.badge { "draft" } }
                    }
                    @if let Some(content) = &post.content {
                        div.body { (PreEscaped(content)) }
                    }
                }
                PostType::Essay => {
                    h2 { a href=(permalink) { (post.title) } }
                    div.meta {
                        (display_date(&post.created_at)) " · "
                        (reading_time_minutes(post.content.as_deref())) " min read"
                        @if show_status && !post.is_published() { " " span.badge { "draft" } }
                    }
                    @if let Some(content) = &post.content {
                        p.body { (excerpt(&strip_html(content), ESSAY_EXCERPT_CHARS)) }
                    }
                }
            }
            (tag_pills(&entry.tags))
        }
    }
}

/// 태그 사이드바 (글 수 포함)
pub fn tag_sidebar(tags: &[TagWithCount], active: Option<&str>) -> Markup {
    html! {
        aside {
            h3 { "Tags" }
            ul {
                @for tag in tags.iter().filter(|t| t.count > 0) {
                    li {
                        @if active == Some(tag.name.as_str()) {
                            strong { (tag.name) }
                        } @else {
                            a href={ "/?tag=" (urlencode(&tag.name)) } { (tag.name) }
                        }
                        " (" (tag.count) ")"
                    }
                }
            }
        }
    }
}

pub fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
