use once_cell::sync::Lazy;
use regex::Regex;

static OUTER_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A```(?i:markdown)?[ ]*\r?\n(.*)\r?\n```\z").expect("outer fence pattern")
});

/// Strips a single fence wrapping the whole document, returning only its interior.
///
/// The trimmed input must open with exactly three backticks (optionally tagged `markdown`, any
/// case) and close with three backticks as its final characters. Anything else is returned
/// unchanged.
pub fn unwrap_outer_fence(input: &str) -> &str {
    let trimmed = input.trim();
    match OUTER_FENCE.captures(trimmed).and_then(|caps| caps.get(1)) {
        Some(interior) => interior.as_str(),
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::unwrap_outer_fence;

    #[test]
    fn markdown_tagged_wrapper_is_removed() {
        assert_eq!(unwrap_outer_fence("```markdown\n# T\ntext\n```"), "# T\ntext");
    }

    #[test]
    fn tag_is_case_insensitive_and_whitespace_is_trimmed() {
        assert_eq!(
            unwrap_outer_fence("\n\n```MarkDown  \nbody\n```\n  "),
            "body"
        );
    }

    #[test]
    fn untagged_wrapper_is_removed() {
        assert_eq!(unwrap_outer_fence("```\nplain\n```"), "plain");
    }

    #[test]
    fn trailing_content_leaves_input_unchanged() {
        let input = "```markdown\n# T\n```\nafter";
        assert_eq!(unwrap_outer_fence(input), input);
    }

    #[test]
    fn other_languages_are_not_unwrapped() {
        let input = "```rust\nfn main() {}\n```";
        assert_eq!(unwrap_outer_fence(input), input);
    }

    #[test]
    fn four_backticks_are_not_a_wrapper() {
        let input = "````\nx\n````";
        assert_eq!(unwrap_outer_fence(input), input);
    }

    #[test]
    fn inner_fences_stay_in_the_interior() {
        let input = "```markdown\nintro\n```sh\nls\n```\n```";
        assert_eq!(unwrap_outer_fence(input), "intro\n```sh\nls\n```");
    }
}
