//! Markdown to HTML with collapsible thoughts and new-tab links.

use pulldown_cmark_escape::{escape_href, escape_html};
use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};

use crate::answer::{Answer, Block};
use crate::config::{HtmlPage, Replacement, TITLE_PLACEHOLDER};

pub const THOUGHTS_SUMMARY: &str = "Thoughts";

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Converts one Markdown document. Raw HTML passes through so local file links survive.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options()).map(open_links_in_new_tab);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Rewrites link events into anchors that open in a new tab. Code spans and code blocks arrive
/// as text events, so their contents are never touched.
fn open_links_in_new_tab(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            ..
        }) => {
            let href = match link_type {
                LinkType::Email if !dest_url.starts_with("mailto:") => format!("mailto:{dest_url}"),
                _ => dest_url.to_string(),
            };
            let mut anchor = String::from("<a href=\"");
            let _ = escape_href(&mut anchor, &href);
            anchor.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\"");
            if !title.is_empty() {
                anchor.push_str(" title=\"");
                let _ = escape_html(&mut anchor, &title);
                anchor.push('"');
            }
            anchor.push('>');
            Event::Html(CowStr::from(anchor))
        }
        Event::End(TagEnd::Link) => Event::Html(CowStr::Borrowed("</a>")),
        other => other,
    }
}

/// Renders the answer from its un-normalized Markdown. Each thoughts block becomes one
/// `<details>` element; the configured replacements run last, in order.
pub fn render_html(answer: &Answer, replacements: &[Replacement]) -> String {
    let mut out = String::new();
    let mut pending: Vec<String> = Vec::new();

    for block in answer.blocks() {
        match block {
            Block::Thoughts(text) => {
                flush(&mut out, &mut pending);
                out.push_str(&format!(
                    "<details class=\"thoughts\"><summary>{THOUGHTS_SUMMARY}</summary>\n"
                ));
                out.push_str(&markdown_to_html(text));
                out.push_str("</details>\n");
            }
            other => pending.push(other.to_markdown()),
        }
    }
    flush(&mut out, &mut pending);

    apply_replacements(out, replacements)
}

fn flush(out: &mut String, pending: &mut Vec<String>) {
    if pending.is_empty() {
        return;
    }
    out.push_str(&markdown_to_html(&pending.join("\n\n")));
    pending.clear();
}

/// Single-line page title from the prompt, cut to `max_len` characters ending in `...`.
pub fn page_title(prompt: &str, max_len: usize) -> String {
    const OMISSION: &str = "...";
    let title = prompt.replace("\r\n", " ").replace(['\n', '\t'], " ");
    let title = title.trim();
    let len = title.chars().count();
    if len <= max_len {
        return title.to_string();
    }
    if max_len <= OMISSION.len() {
        return title.chars().take(max_len).collect();
    }
    let mut cut: String = title.chars().take(max_len - OMISSION.len()).collect();
    cut.push_str(OMISSION);
    cut
}

/// Wraps a finished HTML body in the configured header and footer.
pub fn wrap_page(body: &str, title: &str, page: &HtmlPage) -> String {
    let mut escaped = String::with_capacity(title.len());
    let _ = escape_html(&mut escaped, title);
    let header = page.header.replace(TITLE_PLACEHOLDER, &escaped);
    let mut out = String::with_capacity(header.len() + body.len() + page.footer.len());
    out.push_str(&header);
    out.push_str(body);
    out.push_str(&page.footer);
    out
}

fn apply_replacements(mut html: String, replacements: &[Replacement]) -> String {
    for replacement in replacements.iter().filter(|r| !r.from.is_empty()) {
        html = html.replace(&replacement.from, &replacement.to);
    }
    html
}
