//! Builds an [`Answer`] from response candidates.

use genai_response::{Candidate, GenerateContentResponse, Part};

use super::media::MediaSink;
use super::{Answer, Block, GroundingLink};
use crate::cleanup::{dedent_fence_markers, unwrap_outer_fence};

pub const NO_CONTENT_NOTICE: &str = "No content available in this candidate.";

/// Request-side facts shown in the footer; passed in rather than read from global state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseContext {
    pub model: Option<String>,
    pub tools: Vec<String>,
    /// When the response was processed, already formatted for display.
    pub generated: Option<String>,
}

impl ResponseContext {
    fn footer(&self) -> Option<String> {
        let mut fields = Vec::new();
        if let Some(model) = self.model.as_deref().filter(|model| !model.is_empty()) {
            fields.push(format!("Model: {model}"));
        }
        if !self.tools.is_empty() {
            fields.push(format!("Tools: {}", self.tools.join(", ")));
        }
        if let Some(generated) = self.generated.as_deref().filter(|at| !at.is_empty()) {
            fields.push(format!("Generated: {generated}"));
        }
        (!fields.is_empty()).then(|| fields.join(" · "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleOptions {
    pub include_thoughts: bool,
    /// Candidate text and finish notices only: no thoughts, headings, citations, grounding, or
    /// footer.
    pub pure: bool,
    pub context: Option<ResponseContext>,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            include_thoughts: true,
            pure: false,
            context: None,
        }
    }
}

impl AssembleOptions {
    fn footer(&self) -> Option<Block> {
        if self.pure {
            return None;
        }
        self.context
            .as_ref()
            .and_then(ResponseContext::footer)
            .map(Block::Footer)
    }
}

/// Assembles every candidate, separating them with numbered headings when there is more than
/// one, and appends the metadata footer. An error body yields the error section instead.
pub fn assemble_response(
    response: &GenerateContentResponse,
    options: &AssembleOptions,
    media: &mut dyn MediaSink,
) -> Answer {
    if let Some(error) = response.error.as_ref() {
        return assemble_error(&error.to_string(), options);
    }

    let mut answer = Answer::new();
    let numbered = !options.pure && response.candidates.len() > 1;

    for (idx, candidate) in response.candidates.iter().enumerate() {
        if numbered {
            if idx > 0 {
                answer.push(Block::Rule);
            }
            answer.push(Block::Heading(format!("Candidate #{}", idx + 1)));
        }
        answer.extend(assemble_candidate(candidate, options, media));
    }

    if response.candidates.is_empty() {
        log::warn!("response contained no candidates");
        answer.push(Block::Text("_The response contained no candidates._".to_string()));
    }

    answer.extend(options.footer());
    answer
}

/// The section written when the request failed: the error text, then the footer.
pub fn assemble_error(message: &str, options: &AssembleOptions) -> Answer {
    log::warn!("response is an error: {message}");
    let mut answer = Answer::from(vec![Block::ErrorReport(message.trim().to_string())]);
    answer.extend(options.footer());
    answer
}

/// Turns one candidate into blocks: thoughts first, then content parts in order, then sources,
/// licenses, finish notice, grounding sources, and search suggestions.
pub fn assemble_candidate(
    candidate: &Candidate,
    options: &AssembleOptions,
    media: &mut dyn MediaSink,
) -> Vec<Block> {
    let mut thoughts: Vec<&str> = Vec::new();
    let mut body: Vec<Block> = Vec::new();
    if candidate.content.is_none() {
        body.push(Block::Text(NO_CONTENT_NOTICE.to_string()));
    }

    for part in candidate.parts() {
        match part {
            Part::Thought(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    thoughts.push(text);
                }
            }
            Part::Text(text) => {
                let text = dedent_fence_markers(text);
                match body.last_mut() {
                    Some(Block::Text(previous)) => {
                        // A part may end on a closing fence; the next part starts a new line.
                        if !previous.ends_with('\n') {
                            previous.push('\n');
                        }
                        previous.push_str(&text);
                    }
                    _ => body.push(Block::Text(text)),
                }
            }
            Part::ExecutableCode { language, code } => body.push(Block::Code {
                language: language.clone(),
                source: code.clone(),
            }),
            Part::CodeExecutionResult { outcome, output } => body.push(Block::CodeResult {
                failure: (!outcome.is_ok()).then(|| outcome.as_str().to_string()),
                output: output.clone(),
            }),
            Part::InlineData(blob) => {
                let bytes = match blob.decode() {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        log::warn!("skipping inline data: {err}");
                        continue;
                    }
                };
                match media.persist(&blob.mime_type, &bytes) {
                    Ok(path) => body.push(Block::Media {
                        path,
                        mime_type: blob.mime_type.clone(),
                    }),
                    Err(err) => log::error!("failed to save inline {}: {err}", blob.mime_type),
                }
            }
            Part::FileData {
                mime_type,
                file_uri,
            } => body.push(Block::FileRef {
                uri: file_uri.clone(),
                mime_type: mime_type.clone(),
            }),
            Part::Unsupported => log::debug!("skipping unsupported content part"),
        }
    }

    for block in &mut body {
        if let Block::Text(text) = block {
            let unwrapped = unwrap_outer_fence(text);
            if unwrapped.len() != text.len() {
                *text = unwrapped.to_string();
            }
        }
    }
    body.retain(|block| !matches!(block, Block::Text(text) if text.trim().is_empty()));

    let mut blocks = Vec::with_capacity(body.len() + 6);
    if !thoughts.is_empty() {
        if options.include_thoughts && !options.pure {
            blocks.push(Block::Thoughts(thoughts.join("\n\n")));
        } else {
            log::debug!("omitting {} thought part(s)", thoughts.len());
        }
    }
    blocks.append(&mut body);
    if options.pure {
        blocks.extend(finish_notice(candidate));
    } else {
        blocks.extend(trailer_blocks(candidate));
    }
    blocks
}

fn finish_notice(candidate: &Candidate) -> Option<Block> {
    candidate
        .finish_reason
        .filter(|reason| !reason.is_normal_stop())
        .map(|reason| Block::FinishNotice(reason.as_str().to_string()))
}

fn trailer_blocks(candidate: &Candidate) -> Vec<Block> {
    let mut blocks = Vec::new();

    let citations = candidate.citations();
    let sources: Vec<String> = citations
        .iter()
        .filter_map(|citation| citation.uri.clone())
        .filter(|uri| !uri.is_empty())
        .collect();
    if !sources.is_empty() {
        blocks.push(Block::Sources(sources));
    }
    let licenses: Vec<String> = citations
        .iter()
        .filter_map(|citation| citation.license.clone())
        .filter(|license| !license.is_empty())
        .collect();
    if !licenses.is_empty() {
        blocks.push(Block::Licenses(licenses));
    }

    blocks.extend(finish_notice(candidate));

    if let Some(grounding) = candidate.grounding_metadata.as_ref() {
        let links: Vec<GroundingLink> = grounding
            .grounding_chunks
            .iter()
            .filter_map(|chunk| chunk.source())
            .filter_map(|source| {
                let uri = source.uri.as_deref().filter(|uri| !uri.is_empty())?;
                let title = source
                    .title
                    .as_deref()
                    .filter(|title| !title.is_empty())
                    .unwrap_or(uri);
                Some(GroundingLink::new(title, uri))
            })
            .collect();
        if !links.is_empty() {
            blocks.push(Block::Grounding(links));
        }

        let queries: Vec<String> = grounding
            .web_search_queries
            .iter()
            .map(|query| query.trim())
            .filter(|query| !query.is_empty())
            .map(str::to_string)
            .collect();
        if !queries.is_empty() {
            blocks.push(Block::SearchSuggestions(queries));
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use genai_response::{
        ApiError, Blob, Candidate, ChunkSource, Citation, CitationMetadata, Content, FinishReason,
        GenerateContentResponse, GroundingChunk, GroundingMetadata, Outcome, Part,
    };

    use super::{
        assemble_candidate, assemble_response, AssembleOptions, ResponseContext,
        NO_CONTENT_NOTICE,
    };
    use crate::answer::media::MediaSink;
    use crate::answer::{Block, GroundingLink};

    #[derive(Default)]
    struct RecordingSink {
        stored: Vec<(String, Vec<u8>)>,
        fail: bool,
    }

    impl MediaSink for RecordingSink {
        fn persist(&mut self, mime_type: &str, bytes: &[u8]) -> io::Result<PathBuf> {
            if self.fail {
                return Err(io::Error::other("disk full"));
            }
            self.stored.push((mime_type.to_string(), bytes.to_vec()));
            Ok(PathBuf::from(format!("/media/inline-{}.png", self.stored.len())))
        }
    }

    fn candidate(parts: Vec<Part>) -> Candidate {
        Candidate {
            content: Some(Content {
                role: Some("model".to_string()),
                parts,
            }),
            ..Candidate::default()
        }
    }

    fn assemble(candidate: &Candidate) -> Vec<Block> {
        assemble_candidate(candidate, &AssembleOptions::default(), &mut RecordingSink::default())
    }

    #[test]
    fn thoughts_are_collected_ahead_of_the_body() {
        let blocks = assemble(&candidate(vec![
            Part::thought("  first idea \n"),
            Part::text("Answer"),
            Part::thought("second idea"),
            Part::thought("   "),
        ]));
        assert_eq!(
            blocks,
            vec![
                Block::Thoughts("first idea\n\nsecond idea".to_string()),
                Block::Text("Answer".to_string()),
            ]
        );
    }

    #[test]
    fn thoughts_are_dropped_when_not_requested() {
        let options = AssembleOptions {
            include_thoughts: false,
            ..AssembleOptions::default()
        };
        let blocks = assemble_candidate(
            &candidate(vec![Part::thought("idea"), Part::text("Answer")]),
            &options,
            &mut RecordingSink::default(),
        );
        assert_eq!(blocks, vec![Block::Text("Answer".to_string())]);
    }

    #[test]
    fn adjacent_text_parts_merge_and_fix_fences_per_part() {
        let blocks = assemble(&candidate(vec![
            Part::text("Run:\n   ```sh\nls\n"),
            Part::text("```\n"),
        ]));
        assert_eq!(blocks, vec![Block::Text("Run:\n```sh\nls\n```\n".to_string())]);
    }

    #[test]
    fn part_ending_on_a_closing_fence_does_not_swallow_the_next() {
        let blocks = assemble(&candidate(vec![
            Part::text("Run:\n```sh\nls\n```"),
            Part::text("Done."),
        ]));
        assert_eq!(
            blocks,
            vec![Block::Text("Run:\n```sh\nls\n```\nDone.".to_string())]
        );
    }

    #[test]
    fn candidate_without_content_gets_a_notice() {
        let empty = Candidate {
            finish_reason: Some(FinishReason::Safety),
            ..Candidate::default()
        };
        assert_eq!(
            assemble(&empty),
            vec![
                Block::Text(NO_CONTENT_NOTICE.to_string()),
                Block::FinishNotice("SAFETY".to_string()),
            ]
        );
    }

    #[test]
    fn whole_answer_fence_is_unwrapped() {
        let blocks = assemble(&candidate(vec![Part::text("```markdown\n# T\ntext\n```")]));
        assert_eq!(blocks, vec![Block::Text("# T\ntext".to_string())]);
    }

    #[test]
    fn code_parts_become_code_blocks() {
        let blocks = assemble(&candidate(vec![
            Part::ExecutableCode {
                language: "PYTHON".to_string(),
                code: "print(1)".to_string(),
            },
            Part::CodeExecutionResult {
                outcome: Outcome::Ok,
                output: "1\n".to_string(),
            },
            Part::CodeExecutionResult {
                outcome: Outcome::DeadlineExceeded,
                output: String::new(),
            },
        ]));
        assert_eq!(
            blocks,
            vec![
                Block::Code {
                    language: "PYTHON".to_string(),
                    source: "print(1)".to_string()
                },
                Block::CodeResult {
                    failure: None,
                    output: "1\n".to_string()
                },
                Block::CodeResult {
                    failure: Some("OUTCOME_DEADLINE_EXCEEDED".to_string()),
                    output: String::new()
                },
            ]
        );
    }

    #[test]
    fn inline_data_is_persisted_and_linked() {
        let mut sink = RecordingSink::default();
        let blocks = assemble_candidate(
            &candidate(vec![Part::InlineData(Blob::from_bytes("image/png", &[7, 8]))]),
            &AssembleOptions::default(),
            &mut sink,
        );
        assert_eq!(sink.stored, vec![("image/png".to_string(), vec![7, 8])]);
        assert_eq!(
            blocks,
            vec![Block::Media {
                path: PathBuf::from("/media/inline-1.png"),
                mime_type: "image/png".to_string()
            }]
        );
    }

    #[test]
    fn failed_or_malformed_inline_data_is_skipped() {
        let mut sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };
        let broken = Blob {
            mime_type: "image/png".to_string(),
            data: "%%%".to_string(),
        };
        let blocks = assemble_candidate(
            &candidate(vec![
                Part::InlineData(Blob::from_bytes("image/png", &[1])),
                Part::InlineData(broken),
                Part::text("still here"),
            ]),
            &AssembleOptions::default(),
            &mut sink,
        );
        assert_eq!(blocks, vec![Block::Text("still here".to_string())]);
    }

    #[test]
    fn trailers_follow_in_fixed_order() {
        let mut candidate = candidate(vec![Part::text("Body")]);
        candidate.finish_reason = Some(FinishReason::MaxTokens);
        candidate.citation_metadata = Some(CitationMetadata {
            citations: vec![
                Citation {
                    uri: Some("https://a".to_string()),
                    license: Some("mit".to_string()),
                    ..Citation::default()
                },
                Citation {
                    uri: Some(String::new()),
                    ..Citation::default()
                },
            ],
        });
        candidate.grounding_metadata = Some(GroundingMetadata {
            grounding_chunks: vec![
                GroundingChunk {
                    web: Some(ChunkSource::new("A", "u1")),
                    ..GroundingChunk::default()
                },
                GroundingChunk::default(),
                GroundingChunk {
                    maps: Some(ChunkSource::new("B", "u2")),
                    ..GroundingChunk::default()
                },
                GroundingChunk {
                    retrieved_context: Some(ChunkSource {
                        uri: Some("gs://doc".to_string()),
                        title: None,
                    }),
                    ..GroundingChunk::default()
                },
            ],
            web_search_queries: vec!["rust".to_string(), " ".to_string()],
        });

        let blocks = assemble(&candidate);
        assert_eq!(
            blocks,
            vec![
                Block::Text("Body".to_string()),
                Block::Sources(vec!["https://a".to_string()]),
                Block::Licenses(vec!["mit".to_string()]),
                Block::FinishNotice("MAX_TOKENS".to_string()),
                Block::Grounding(vec![
                    GroundingLink::new("A", "u1"),
                    GroundingLink::new("B", "u2"),
                    GroundingLink::new("gs://doc", "gs://doc"),
                ]),
                Block::SearchSuggestions(vec!["rust".to_string()]),
            ]
        );
    }

    #[test]
    fn normal_stop_has_no_notice() {
        let mut candidate = candidate(vec![Part::text("Body")]);
        candidate.finish_reason = Some(FinishReason::Stop);
        assert_eq!(assemble(&candidate), vec![Block::Text("Body".to_string())]);
    }

    #[test]
    fn multiple_candidates_are_numbered_and_separated() {
        let response = GenerateContentResponse {
            candidates: vec![
                candidate(vec![Part::text("one")]),
                candidate(vec![Part::text("two")]),
            ],
            ..GenerateContentResponse::default()
        };
        let answer = assemble_response(
            &response,
            &AssembleOptions::default(),
            &mut RecordingSink::default(),
        );
        assert_eq!(
            answer.blocks(),
            &[
                Block::Heading("Candidate #1".to_string()),
                Block::Text("one".to_string()),
                Block::Rule,
                Block::Heading("Candidate #2".to_string()),
                Block::Text("two".to_string()),
            ]
        );
    }

    #[test]
    fn single_candidate_has_no_heading_and_footer_lists_context() {
        let response = GenerateContentResponse {
            candidates: vec![candidate(vec![Part::text("only")])],
            ..GenerateContentResponse::default()
        };
        let options = AssembleOptions {
            context: Some(ResponseContext {
                model: Some("gemini-2.5-pro".to_string()),
                tools: vec!["google_search".to_string(), "code_execution".to_string()],
                generated: None,
            }),
            ..AssembleOptions::default()
        };
        let answer = assemble_response(&response, &options, &mut RecordingSink::default());
        assert_eq!(
            answer.blocks(),
            &[
                Block::Text("only".to_string()),
                Block::Footer(
                    "Model: gemini-2.5-pro · Tools: google_search, code_execution".to_string()
                ),
            ]
        );
    }

    fn context() -> ResponseContext {
        ResponseContext {
            model: Some("gemini-2.5-flash".to_string()),
            tools: Vec::new(),
            generated: Some("2026-10-18T09:15:02Z".to_string()),
        }
    }

    #[test]
    fn footer_includes_generation_time() {
        assert_eq!(
            context().footer().as_deref(),
            Some("Model: gemini-2.5-flash · Generated: 2026-10-18T09:15:02Z")
        );
        assert_eq!(ResponseContext::default().footer(), None);
    }

    #[test]
    fn pure_mode_keeps_only_text_and_finish_notices() {
        let mut first = candidate(vec![Part::thought("idea"), Part::text("one")]);
        first.finish_reason = Some(FinishReason::MaxTokens);
        first.citation_metadata = Some(CitationMetadata {
            citations: vec![Citation {
                uri: Some("https://a".to_string()),
                ..Citation::default()
            }],
        });
        let response = GenerateContentResponse {
            candidates: vec![first, candidate(vec![Part::text("two")])],
            ..GenerateContentResponse::default()
        };
        let options = AssembleOptions {
            pure: true,
            context: Some(context()),
            ..AssembleOptions::default()
        };
        let answer = assemble_response(&response, &options, &mut RecordingSink::default());
        assert_eq!(
            answer.blocks(),
            &[
                Block::Text("one".to_string()),
                Block::FinishNotice("MAX_TOKENS".to_string()),
                Block::Text("two".to_string()),
            ]
        );
    }

    #[test]
    fn error_body_becomes_an_error_section_with_footer() {
        let response = GenerateContentResponse {
            candidates: vec![candidate(vec![Part::text("ignored")])],
            error: Some(ApiError {
                code: Some(400),
                message: "API key not valid".to_string(),
                status: Some("INVALID_ARGUMENT".to_string()),
            }),
            ..GenerateContentResponse::default()
        };
        let options = AssembleOptions {
            context: Some(context()),
            ..AssembleOptions::default()
        };
        let answer = assemble_response(&response, &options, &mut RecordingSink::default());
        assert_eq!(
            answer.blocks(),
            &[
                Block::ErrorReport(
                    "Error 400, Message: API key not valid, Status: INVALID_ARGUMENT".to_string()
                ),
                Block::Footer(
                    "Model: gemini-2.5-flash · Generated: 2026-10-18T09:15:02Z".to_string()
                ),
            ]
        );
    }
}
