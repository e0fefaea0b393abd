//! # RSS 2.0 피드 생성
//!
//! 피드는 두 개입니다.
//!
//! | 피드 | 항목 link | guid | 설명 |
//! |------|-----------|------|------|
//! | `/feed/essays` | 글 고유 주소 | 고유 주소 (`isPermaLink="true"`) | 본문 앞 200자 + `…` |
//! | `/feed/log` | 외부 URL (없으면 고유 주소) | 고유 주소 (`isPermaLink="false"`) | `[도메인] ` + 본문 |
//!
//! 제목과 설명은 CDATA로 감싸고, link/guid 같은 일반 텍스트 노드는 XML 이스케이프합니다.

use chrono::{DateTime, Utc};

use crate::models::Post;
use crate::services::text::{excerpt, extract_domain, strip_html};

const ESSAY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct Channel {
    pub title: String,
    pub description: String,
    pub site_url: String,
    /// `atom:link rel="self"`에 들어갈 피드 자신의 주소
    pub self_url: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub title: String,
    pub link: String,
    pub guid: String,
    pub guid_is_permalink: bool,
    pub pub_date: String,
    pub description: String,
}

pub fn permalink(site_url: &str, post_id: &str) -> String {
    format!("{site_url}/post/{post_id}")
}

/// 에세이 피드 항목
pub fn essay_item(post: &Post, site_url: &str) -> Item {
    let link = permalink(site_url, &post.id);
    let description = post
        .content
        .as_deref()
        .map(|c| excerpt(&strip_html(c), ESSAY_EXCERPT_CHARS))
        .unwrap_or_default();

    Item {
        title: post.title.clone(),
        link: link.clone(),
        guid: link,
        guid_is_permalink: true,
        pub_date: rfc822_date(&post.created_at),
        description,
    }
}

/// 독서 기록 피드 항목
///
/// link는 외부 URL일 수 있으므로 guid는 고유 주소로 두고 permalink가 아니라고 표시합니다.
pub fn log_item(post: &Post, site_url: &str) -> Item {
    let guid = permalink(site_url, &post.id);
    let link = post.url.clone().unwrap_or_else(|| guid.clone());
    let domain = post
        .domain
        .clone()
        .or_else(|| post.url.as_deref().map(extract_domain));

    let body = post.content.as_deref().map(strip_html).unwrap_or_default();
    let description = match domain {
        Some(domain) => format!("[{domain}] {body}"),
        None => body,
    };

    Item {
        title: post.title.clone(),
        link,
        guid,
        guid_is_permalink: false,
        pub_date: rfc822_date(&post.created_at),
        description,
    }
}

/// 채널 전체를 XML 문자열로 렌더링합니다.
pub fn render(channel: &Channel, built_at: DateTime<Utc>) -> String {
    let items: Vec<String> = channel.items.iter().map(render_item).collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>{title}</title>
    <description>{description}</description>
    <link>{link}</link>
    <atom:link href="{self_url}" rel="self" type="application/rss+xml"/>
    <language>en-us</language>
    <lastBuildDate>{built}</lastBuildDate>
{items}
  </channel>
</rss>"#,
        title = cdata(&channel.title),
        description = cdata(&channel.description),
        link = escape_xml(&channel.site_url),
        self_url = escape_xml(&channel.self_url),
        built = format_rfc822(built_at),
        items = items.join("\n"),
    )
}

fn render_item(item: &Item) -> String {
    format!(
        r#"    <item>
      <title>{title}</title>
      <link>{link}</link>
      <guid isPermaLink="{permalink}">{guid}</guid>
      <pubDate>{date}</pubDate>
      <description>{description}</description>
    </item>"#,
        title = cdata(&item.title),
        link = escape_xml(&item.link),
        permalink = item.guid_is_permalink,
        guid = escape_xml(&item.guid),
        date = item.pub_date,
        description = cdata(&item.description),
    )
}

/// CDATA 섹션. 본문에 `]]>`가 있으면 두 섹션으로 나눕니다.
pub fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// DB에 저장된 ISO 8601 시각을 RSS용 날짜(`Thu, 16 Oct 2026 12:00:00 GMT`)로 바꿉니다.
fn rfc822_date(stored: &str) -> String {
    DateTime::parse_from_rfc3339(stored)
        .map(|dt| format_rfc822(dt.with_timezone(&Utc)))
        .unwrap_or_else(|_| stored.to_string())
}

fn format_rfc822(dt: DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
