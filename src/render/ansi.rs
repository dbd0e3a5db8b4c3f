//! Markdown to styled terminal text.

use markdown::mdast::{self, AlignKind};
use markdown::{to_mdast, Constructs, ParseOptions};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::highlight::CodeHighlighter;
use crate::config::Replacement;
use crate::core::text::ansi::apply_color_replacements;
use crate::core::text::width::visible_width;
use crate::core::text::wrap::wrap_text_with_ansi;
use crate::error::RenderError;

pub type StyleFn = Box<dyn Fn(&str) -> String>;

static SHORTCODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([a-z0-9_+\-]+):").expect("shortcode pattern"));

const HR_MAX_WIDTH: usize = 80;
const CODE_INDENT: &str = "  ";

pub struct AnsiTheme {
    pub heading: StyleFn,
    pub link: StyleFn,
    pub link_url: StyleFn,
    pub code: StyleFn,
    pub code_block: StyleFn,
    pub code_block_border: StyleFn,
    pub quote: StyleFn,
    pub quote_border: StyleFn,
    pub hr: StyleFn,
    pub list_bullet: StyleFn,
    pub bold: StyleFn,
    pub italic: StyleFn,
    pub strikethrough: StyleFn,
    pub underline: StyleFn,
}

fn ansi_wrap(text: &str, prefix: &str, suffix: &str) -> String {
    format!("{prefix}{text}{suffix}")
}

impl AnsiTheme {
    /// 16-color palette that reads on both dark and light terminals.
    pub fn terminal() -> Self {
        Self {
            heading: Box::new(|t| ansi_wrap(t, "\x1b[36m", "\x1b[39m")),
            link: Box::new(|t| ansi_wrap(t, "\x1b[34m", "\x1b[39m")),
            link_url: Box::new(|t| ansi_wrap(t, "\x1b[2m", "\x1b[22m")),
            code: Box::new(|t| ansi_wrap(t, "\x1b[33m", "\x1b[39m")),
            code_block: Box::new(|t| ansi_wrap(t, "\x1b[32m", "\x1b[39m")),
            code_block_border: Box::new(|t| ansi_wrap(t, "\x1b[2m", "\x1b[22m")),
            quote: Box::new(|t| ansi_wrap(t, "\x1b[3m", "\x1b[23m")),
            quote_border: Box::new(|t| ansi_wrap(t, "\x1b[2m", "\x1b[22m")),
            hr: Box::new(|t| ansi_wrap(t, "\x1b[2m", "\x1b[22m")),
            list_bullet: Box::new(|t| ansi_wrap(t, "\x1b[36m", "\x1b[39m")),
            bold: Box::new(|t| ansi_wrap(t, "\x1b[1m", "\x1b[22m")),
            italic: Box::new(|t| ansi_wrap(t, "\x1b[3m", "\x1b[23m")),
            strikethrough: Box::new(|t| ansi_wrap(t, "\x1b[9m", "\x1b[29m")),
            underline: Box::new(|t| ansi_wrap(t, "\x1b[4m", "\x1b[24m")),
        }
    }

    /// No escapes at all; layout only.
    pub fn plain() -> Self {
        fn plain(text: &str) -> String {
            text.to_string()
        }
        Self {
            heading: Box::new(plain),
            link: Box::new(plain),
            link_url: Box::new(plain),
            code: Box::new(plain),
            code_block: Box::new(plain),
            code_block_border: Box::new(plain),
            quote: Box::new(plain),
            quote_border: Box::new(plain),
            hr: Box::new(plain),
            list_bullet: Box::new(plain),
            bold: Box::new(plain),
            italic: Box::new(plain),
            strikethrough: Box::new(plain),
            underline: Box::new(plain),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnsiOptions<'a> {
    pub width: usize,
    /// Syntect theme for fenced code.
    pub theme_name: &'a str,
    pub replacements: &'a [Replacement],
}

/// Renders Markdown to terminal text wrapped at `options.width`, then applies the literal
/// color-code replacements in order.
pub fn render_ansi(markdown: &str, options: &AnsiOptions<'_>) -> Result<String, RenderError> {
    let highlighter = CodeHighlighter::new(options.theme_name)?;
    let renderer = AnsiRenderer::new(AnsiTheme::terminal(), Some(highlighter));
    let lines = renderer.render(markdown, options.width)?;
    if lines.is_empty() {
        return Ok(String::new());
    }
    let mut output = lines.join("\n");
    output.push('\n');
    Ok(apply_color_replacements(&output, options.replacements))
}

fn parse_options() -> ParseOptions {
    ParseOptions {
        constructs: Constructs {
            math_flow: true,
            math_text: true,
            ..Constructs::gfm()
        },
        math_text_single_dollar: false,
        ..ParseOptions::gfm()
    }
}

/// A line produced while laying out a list item.
enum ItemLine {
    Own(String),
    /// Already indented by a nested list.
    Nested(String),
}

pub struct AnsiRenderer {
    theme: AnsiTheme,
    highlighter: Option<CodeHighlighter>,
}

impl AnsiRenderer {
    pub fn new(theme: AnsiTheme, highlighter: Option<CodeHighlighter>) -> Self {
        Self { theme, highlighter }
    }

    /// Lays `text` out as lines no wider than `width` visible columns.
    pub fn render(&self, text: &str, width: usize) -> Result<Vec<String>, RenderError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let width = width.max(1);
        let source = text.replace('\t', "   ");
        let root = to_mdast(&source, &parse_options())
            .map_err(|err| RenderError::Markdown(err.to_string()))?;
        let nodes = match root {
            mdast::Node::Root(root) => root.children,
            other => vec![other],
        };

        let mut lines = Vec::new();
        for (idx, node) in nodes.iter().enumerate() {
            let block = self.render_block(node, width, &source);
            if block.is_empty() {
                continue;
            }
            if idx > 0 && !lines.is_empty() {
                lines.push(String::new());
            }
            lines.extend(block);
        }

        Ok(lines
            .iter()
            .flat_map(|line| wrap_text_with_ansi(line, width))
            .collect())
    }

    fn render_block(&self, node: &mdast::Node, width: usize, source: &str) -> Vec<String> {
        match node {
            mdast::Node::Heading(heading) => {
                let text = self.render_inline(&heading.children, "");
                let styled = match heading.depth {
                    1 => (self.theme.heading)(&(self.theme.bold)(&(self.theme.underline)(&text))),
                    2 => (self.theme.heading)(&(self.theme.bold)(&text)),
                    depth => {
                        let prefix = "#".repeat(usize::from(depth));
                        (self.theme.heading)(&(self.theme.bold)(&format!("{prefix} {text}")))
                    }
                };
                vec![styled]
            }
            mdast::Node::Paragraph(paragraph) => {
                split_lines(&self.render_inline(&paragraph.children, ""))
            }
            mdast::Node::Code(code) => self.render_code(&code.value, code.lang.as_deref()),
            mdast::Node::Math(math) => {
                let mut lines = vec![(self.theme.code_block_border)("$$")];
                lines.extend(
                    math.value
                        .split('\n')
                        .map(|line| format!("{CODE_INDENT}{}", (self.theme.code)(line))),
                );
                lines.push((self.theme.code_block_border)("$$"));
                lines
            }
            mdast::Node::List(list) => self.render_list(list, 0, width, source),
            mdast::Node::Blockquote(quote) => self.render_blockquote(quote, width, source),
            mdast::Node::ThematicBreak(_) => {
                vec![(self.theme.hr)(&"─".repeat(width.min(HR_MAX_WIDTH)))]
            }
            mdast::Node::Html(html) => split_lines(html.value.trim()),
            mdast::Node::Table(table) => self.render_table(table, width, source),
            mdast::Node::FootnoteDefinition(definition) => {
                let label = definition.label.as_deref().unwrap_or(&definition.identifier);
                let marker = (self.theme.link_url)(&format!("[^{label}]:"));
                let body: Vec<String> = definition
                    .children
                    .iter()
                    .flat_map(|child| self.render_block(child, width, source))
                    .collect();
                match body.split_first() {
                    Some((first, rest)) => {
                        let mut lines = vec![format!("{marker} {first}")];
                        lines.extend(rest.iter().map(|line| format!("    {line}")));
                        lines
                    }
                    None => vec![marker],
                }
            }
            mdast::Node::Definition(_) => Vec::new(),
            other => split_lines(&self.render_inline(std::slice::from_ref(other), "")),
        }
    }

    fn render_code(&self, code: &str, language: Option<&str>) -> Vec<String> {
        let mut lines = vec![(self.theme.code_block_border)(&format!(
            "```{}",
            language.unwrap_or_default()
        ))];
        match self.highlighter.as_ref() {
            Some(highlighter) => lines.extend(
                highlighter
                    .highlight_or_plain(code, language)
                    .into_iter()
                    .map(|line| format!("{CODE_INDENT}{line}")),
            ),
            None => lines.extend(
                code.split('\n')
                    .map(|line| format!("{CODE_INDENT}{}", (self.theme.code_block)(line))),
            ),
        }
        lines.push((self.theme.code_block_border)("```"));
        lines
    }

    /// `reopen` restores the surrounding style after a nested span closes.
    fn render_inline(&self, nodes: &[mdast::Node], reopen: &str) -> String {
        let mut out = String::new();
        for node in nodes {
            match node {
                mdast::Node::Text(text) => out.push_str(&expand_shortcodes(&text.value)),
                mdast::Node::Paragraph(paragraph) => {
                    out.push_str(&self.render_inline(&paragraph.children, reopen));
                }
                mdast::Node::Strong(strong) => {
                    out.push_str(&(self.theme.bold)(&self.render_inline(&strong.children, reopen)));
                    out.push_str(reopen);
                }
                mdast::Node::Emphasis(emphasis) => {
                    let content = self.render_inline(&emphasis.children, reopen);
                    out.push_str(&(self.theme.italic)(&content));
                    out.push_str(reopen);
                }
                mdast::Node::Delete(delete) => {
                    let content = self.render_inline(&delete.children, reopen);
                    out.push_str(&(self.theme.strikethrough)(&content));
                    out.push_str(reopen);
                }
                mdast::Node::InlineCode(code) => {
                    out.push_str(&(self.theme.code)(&code.value));
                    out.push_str(reopen);
                }
                mdast::Node::InlineMath(math) => {
                    out.push_str(&(self.theme.code)(&math.value));
                    out.push_str(reopen);
                }
                mdast::Node::Link(link) => {
                    let text = self.render_inline(&link.children, reopen);
                    let plain = plain_text(&link.children);
                    let href = link.url.as_str();
                    let href_bare = href.strip_prefix("mailto:").unwrap_or(href);
                    out.push_str(&(self.theme.link)(&(self.theme.underline)(&text)));
                    if plain != href && plain != href_bare {
                        out.push_str(&(self.theme.link_url)(&format!(" ({href})")));
                    }
                    out.push_str(reopen);
                }
                mdast::Node::LinkReference(link) => {
                    out.push_str(&self.render_inline(&link.children, reopen));
                }
                mdast::Node::Image(image) => {
                    let label = if image.alt.is_empty() {
                        image.url.as_str()
                    } else {
                        image.alt.as_str()
                    };
                    out.push_str(&(self.theme.link)(&format!("[image: {label}]")));
                    out.push_str(reopen);
                }
                mdast::Node::ImageReference(image) => out.push_str(&image.alt),
                mdast::Node::FootnoteReference(reference) => {
                    let label = reference.label.as_deref().unwrap_or(&reference.identifier);
                    out.push_str(&(self.theme.link_url)(&format!("[^{label}]")));
                    out.push_str(reopen);
                }
                mdast::Node::Break(_) => out.push('\n'),
                mdast::Node::Html(html) => out.push_str(&html.value),
                _ => {}
            }
        }
        out
    }

    fn render_list(
        &self,
        list: &mdast::List,
        depth: usize,
        width: usize,
        source: &str,
    ) -> Vec<String> {
        let indent = "  ".repeat(depth);
        let start = list.start.unwrap_or(1);
        let mut lines = Vec::new();

        for (idx, node) in list.children.iter().enumerate() {
            let mdast::Node::ListItem(item) = node else {
                continue;
            };
            let mut bullet = if list.ordered {
                format!("{}. ", start as usize + idx)
            } else {
                "- ".to_string()
            };
            match item.checked {
                Some(true) => bullet.push_str("[x] "),
                Some(false) => bullet.push_str("[ ] "),
                None => {}
            }
            let bullet = (self.theme.list_bullet)(&bullet);

            let mut has_bullet = false;
            for line in self.render_list_item(item, depth, width, source) {
                match line {
                    ItemLine::Own(line) if !has_bullet => {
                        lines.push(format!("{indent}{bullet}{line}"));
                        has_bullet = true;
                    }
                    ItemLine::Own(line) => lines.push(format!("{indent}  {line}")),
                    ItemLine::Nested(line) => {
                        if !has_bullet {
                            lines.push(format!("{indent}{bullet}"));
                            has_bullet = true;
                        }
                        lines.push(line);
                    }
                }
            }
            if !has_bullet {
                lines.push(format!("{indent}{bullet}"));
            }
        }
        lines
    }

    fn render_list_item(
        &self,
        item: &mdast::ListItem,
        depth: usize,
        width: usize,
        source: &str,
    ) -> Vec<ItemLine> {
        let mut lines = Vec::new();
        for node in &item.children {
            match node {
                mdast::Node::List(list) => lines.extend(
                    self.render_list(list, depth + 1, width, source)
                        .into_iter()
                        .map(ItemLine::Nested),
                ),
                other => lines.extend(
                    self.render_block(other, width, source)
                        .into_iter()
                        .map(ItemLine::Own),
                ),
            }
        }
        lines
    }

    fn render_blockquote(
        &self,
        quote: &mdast::Blockquote,
        width: usize,
        source: &str,
    ) -> Vec<String> {
        let style = |text: &str| (self.theme.quote)(&(self.theme.italic)(text));
        let reopen = style_prefix(&style);
        let inner_width = width.saturating_sub(2).max(1);
        let border = (self.theme.quote_border)("│ ");

        let mut lines = Vec::new();
        for (idx, child) in quote.children.iter().enumerate() {
            if idx > 0 {
                lines.push(border.trim_end().to_string());
            }
            let body = match child {
                mdast::Node::Paragraph(paragraph) => {
                    split_lines(&self.render_inline(&paragraph.children, &reopen))
                        .iter()
                        .map(|line| style(line))
                        .collect()
                }
                other => self.render_block(other, inner_width, source),
            };
            for line in body {
                for wrapped in wrap_text_with_ansi(&line, inner_width) {
                    lines.push(format!("{border}{wrapped}"));
                }
            }
        }
        lines
    }

    fn render_table(&self, table: &mdast::Table, width: usize, source: &str) -> Vec<String> {
        let rows: Vec<Vec<String>> = table
            .children
            .iter()
            .filter_map(|node| match node {
                mdast::Node::TableRow(row) => Some(
                    row.children
                        .iter()
                        .map(|cell| match cell {
                            mdast::Node::TableCell(cell) => self.render_inline(&cell.children, ""),
                            other => self.render_inline(std::slice::from_ref(other), ""),
                        })
                        .collect(),
                ),
                _ => None,
            })
            .collect();
        let num_cols = rows.first().map_or(0, Vec::len);
        if num_cols == 0 {
            return Vec::new();
        }

        let border_overhead = 3 * num_cols + 1;
        let available = width.saturating_sub(border_overhead);
        if available < num_cols {
            // Too narrow for a grid; show the source rows instead.
            let raw = table
                .position
                .as_ref()
                .and_then(|pos| source.get(pos.start.offset..pos.end.offset))
                .unwrap_or_default();
            return split_lines(raw);
        }

        let mut widths = vec![1usize; num_cols];
        for row in &rows {
            for (col, cell) in row.iter().enumerate().take(num_cols) {
                widths[col] = widths[col].max(visible_width(cell));
            }
        }
        while widths.iter().sum::<usize>() > available {
            let Some((widest, _)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
                break;
            };
            if widths[widest] <= 1 {
                break;
            }
            widths[widest] -= 1;
        }

        let rule = |left: &str, mid: &str, right: &str| {
            let cells: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
            let joined = cells.join(&format!("─{mid}─"));
            (self.theme.code_block_border)(&format!("{left}─{joined}─{right}"))
        };
        let bar = (self.theme.code_block_border)("│");

        let mut lines = vec![rule("┌", "┬", "┐")];
        for (row_idx, row) in rows.iter().enumerate() {
            let wrapped: Vec<Vec<String>> = (0..num_cols)
                .map(|col| {
                    let text = row.get(col).map(String::as_str).unwrap_or_default();
                    wrap_text_with_ansi(text, widths[col])
                })
                .collect();
            let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);
            for line_idx in 0..height {
                let cells: Vec<String> = (0..num_cols)
                    .map(|col| {
                        let text = wrapped[col]
                            .get(line_idx)
                            .map(String::as_str)
                            .unwrap_or_default();
                        let align = table.align.get(col).copied().unwrap_or(AlignKind::None);
                        let padded = pad_cell(text, widths[col], align);
                        if row_idx == 0 {
                            (self.theme.bold)(&padded)
                        } else {
                            padded
                        }
                    })
                    .collect();
                lines.push(format!("{bar} {} {bar}", cells.join(&format!(" {bar} "))));
            }
            if row_idx == 0 {
                lines.push(rule("├", "┼", "┤"));
            }
        }
        lines.push(rule("└", "┴", "┘"));
        lines
    }
}

fn pad_cell(text: &str, width: usize, align: AlignKind) -> String {
    let gap = width.saturating_sub(visible_width(text));
    match align {
        AlignKind::Right => format!("{}{text}", " ".repeat(gap)),
        AlignKind::Center => {
            let left = gap / 2;
            format!("{}{text}{}", " ".repeat(left), " ".repeat(gap - left))
        }
        AlignKind::Left | AlignKind::None => format!("{text}{}", " ".repeat(gap)),
    }
}

/// Escape sequence a style function emits before its content.
fn style_prefix(style: &dyn Fn(&str) -> String) -> String {
    let sentinel = "\u{0000}";
    let styled = style(sentinel);
    styled
        .find(sentinel)
        .map(|idx| styled[..idx].to_string())
        .unwrap_or_default()
}

fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

/// Replaces `:name:` with the emoji it names; unknown names are left alone.
fn expand_shortcodes(text: &str) -> String {
    if !text.contains(':') {
        return text.to_string();
    }
    SHORTCODE
        .replace_all(text, |caps: &Captures<'_>| match emojis::get_by_shortcode(&caps[1]) {
            Some(emoji) => emoji.as_str().to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn plain_text(nodes: &[mdast::Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            mdast::Node::Text(text) => out.push_str(&text.value),
            mdast::Node::InlineCode(code) => out.push_str(&code.value),
            mdast::Node::Image(image) => out.push_str(&image.alt),
            other => {
                if let Some(children) = other.children() {
                    out.push_str(&plain_text(children));
                }
            }
        }
    }
    out
}
