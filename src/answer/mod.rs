//! Typed intermediate document built from a model response.
//!
//! An [`Answer`] is an ordered list of [`Block`]s. Renderers walk the blocks directly, so a
//! thought region is a value, not a placeholder string that could leak into output.

pub mod assemble;
pub mod media;

use std::path::{Path, PathBuf};

use url::form_urlencoded;
use url::Url;

pub use assemble::{
    assemble_candidate, assemble_error, assemble_response, AssembleOptions, ResponseContext,
    NO_CONTENT_NOTICE,
};
pub use media::{DirectorySink, MediaSink};

const SEARCH_URL: &str = "https://www.google.com/search?q=";
pub const PROMPT_HEADING: &str = "Prompt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingLink {
    pub title: String,
    pub uri: String,
}

impl GroundingLink {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading(String),
    /// Model-authored Markdown.
    Text(String),
    /// Aggregated reasoning trace, shown collapsed where the format allows it.
    Thoughts(String),
    Code {
        language: String,
        source: String,
    },
    CodeResult {
        /// Outcome label, present only when execution did not succeed.
        failure: Option<String>,
        output: String,
    },
    Media {
        path: PathBuf,
        mime_type: String,
    },
    FileRef {
        uri: String,
        mime_type: String,
    },
    Sources(Vec<String>),
    Licenses(Vec<String>),
    FinishNotice(String),
    Grounding(Vec<GroundingLink>),
    SearchSuggestions(Vec<String>),
    /// Error returned by the service instead of candidates.
    ErrorReport(String),
    Rule,
    Footer(String),
}

impl Block {
    /// Markdown source for this block, before any cleanup pass.
    pub fn to_markdown(&self) -> String {
        match self {
            Self::Heading(title) => format!("## {title}"),
            Self::Text(text) | Self::Thoughts(text) => text.clone(),
            Self::Code { language, source } => fenced(&language.to_ascii_lowercase(), source),
            Self::CodeResult { failure, output } => {
                let block = fenced("plaintext", output);
                match failure {
                    Some(label) => format!("**Outcome: {label}**\n\n{block}"),
                    None => block,
                }
            }
            Self::Media { path, mime_type } => {
                let url = file_url(path);
                if mime_type.starts_with("image/") {
                    format!("![{mime_type}]({url})")
                } else {
                    let name = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| url.clone());
                    format!("[{name} ({mime_type})]({url})")
                }
            }
            Self::FileRef { uri, mime_type } if mime_type.is_empty() => format!("File: {uri}"),
            Self::FileRef { uri, mime_type } => format!("File: {uri} ({mime_type})"),
            Self::Sources(uris) => {
                let items: Vec<String> = uris
                    .iter()
                    .enumerate()
                    .map(|(idx, uri)| format!("{}. [{uri}]({uri})\n", idx + 1))
                    .collect();
                format!("**Sources**\n\n{}", items.concat().trim_end())
            }
            Self::Licenses(licenses) => {
                let items: Vec<String> = licenses.iter().map(|l| format!("- {l}")).collect();
                format!("**Licenses**\n\n{}", items.join("\n"))
            }
            Self::FinishNotice(reason) => format!("> Finish reason: `{reason}`"),
            Self::Grounding(links) => format!(
                "**Search sources used**\n\n{}",
                grounding_list(links).trim_end()
            ),
            Self::SearchSuggestions(queries) => {
                let items: Vec<String> = queries
                    .iter()
                    .map(|query| format!("- [{query}]({})", search_url(query)))
                    .collect();
                format!("**Search suggestions**\n\n{}", items.join("\n"))
            }
            Self::ErrorReport(message) => {
                format!("**Error response**\n\n{}", fenced("plaintext", message))
            }
            Self::Rule => "---".to_string(),
            Self::Footer(text) => format!("*{text}*"),
        }
    }
}

/// Numbered Markdown links, one per line, each terminated by a newline.
pub fn grounding_list(links: &[GroundingLink]) -> String {
    links
        .iter()
        .enumerate()
        .map(|(idx, link)| format!("{}. [{}]({})\n", idx + 1, link.title, link.uri))
        .collect()
}

/// Web-search URL for `query`, percent-encoded as a form value.
pub fn search_url(query: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("{SEARCH_URL}{encoded}")
}

fn fenced(info: &str, body: &str) -> String {
    format!("```{info}\n{}\n```", body.trim_end_matches('\n'))
}

fn file_url(path: &Path) -> String {
    Url::from_file_path(path)
        .map(String::from)
        .unwrap_or_else(|()| format!("file://{}", path.display()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answer {
    blocks: Vec<Block>,
}

impl Answer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The prompt echo section written at the start of each turn. The prompt is shown verbatim
    /// in a plaintext fence, never interpreted as Markdown.
    pub fn prompt(text: &str) -> Self {
        let text = text.trim_start_matches(['\r', '\n']).trim_end();
        Self {
            blocks: vec![
                Block::Heading(PROMPT_HEADING.to_string()),
                Block::Code {
                    language: "plaintext".to_string(),
                    source: text.to_string(),
                },
            ],
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl From<Vec<Block>> for Answer {
    fn from(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }
}

impl Extend<Block> for Answer {
    fn extend<I: IntoIterator<Item = Block>>(&mut self, iter: I) {
        self.blocks.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::{grounding_list, search_url, Answer, Block, GroundingLink};
    use std::path::PathBuf;

    #[test]
    fn grounding_list_numbers_from_one() {
        let links = vec![GroundingLink::new("A", "u1"), GroundingLink::new("B", "u2")];
        assert_eq!(grounding_list(&links), "1. [A](u1)\n2. [B](u2)\n");
    }

    #[test]
    fn search_url_encodes_query() {
        assert_eq!(
            search_url("rust & c++"),
            "https://www.google.com/search?q=rust+%26+c%2B%2B"
        );
    }

    #[test]
    fn code_blocks_use_lowercase_language() {
        let block = Block::Code {
            language: "PYTHON".to_string(),
            source: "print(1)\n".to_string(),
        };
        assert_eq!(block.to_markdown(), "```python\nprint(1)\n```");
    }

    #[test]
    fn failed_code_result_is_labelled() {
        let block = Block::CodeResult {
            failure: Some("OUTCOME_FAILED".to_string()),
            output: "Traceback".to_string(),
        };
        assert_eq!(
            block.to_markdown(),
            "**Outcome: OUTCOME_FAILED**\n\n```plaintext\nTraceback\n```"
        );
    }

    #[test]
    fn media_links_use_file_urls() {
        let image = Block::Media {
            path: PathBuf::from("/tmp/out/inline-1.png"),
            mime_type: "image/png".to_string(),
        };
        assert_eq!(image.to_markdown(), "![image/png](file:///tmp/out/inline-1.png)");

        let pdf = Block::Media {
            path: PathBuf::from("/tmp/out/inline-2.pdf"),
            mime_type: "application/pdf".to_string(),
        };
        assert_eq!(
            pdf.to_markdown(),
            "[inline-2.pdf (application/pdf)](file:///tmp/out/inline-2.pdf)"
        );
    }

    #[test]
    fn sources_are_numbered_links() {
        let block = Block::Sources(vec!["https://a".to_string(), "docs/guide.md".to_string()]);
        assert_eq!(
            block.to_markdown(),
            "**Sources**\n\n1. [https://a](https://a)\n2. [docs/guide.md](docs/guide.md)"
        );
    }

    #[test]
    fn error_report_is_fenced() {
        let block = Block::ErrorReport("Error 429, Message: quota exceeded".to_string());
        assert_eq!(
            block.to_markdown(),
            "**Error response**\n\n```plaintext\nError 429, Message: quota exceeded\n```"
        );
    }

    #[test]
    fn prompt_is_echoed_verbatim_in_a_plaintext_fence() {
        let answer = Answer::prompt("\nExplain:\n    fn main() {}\n# not a heading\n\n");
        assert_eq!(
            answer.blocks(),
            &[
                Block::Heading("Prompt".to_string()),
                Block::Code {
                    language: "plaintext".to_string(),
                    source: "Explain:\n    fn main() {}\n# not a heading".to_string(),
                },
            ]
        );
        assert_eq!(
            answer.blocks()[1].to_markdown(),
            "```plaintext\nExplain:\n    fn main() {}\n# not a heading\n```"
        );
    }
}
