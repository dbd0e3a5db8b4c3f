use crate::answer::{Answer, Block};
use crate::cleanup::normalize_indentation;

pub const THOUGHTS_HEADING: &str = "**Thoughts — model reasoning**";

/// Renders the answer as normalized Markdown. Thoughts flow inline under a bold heading.
pub fn render_markdown(answer: &Answer) -> String {
    let sections: Vec<String> = answer
        .blocks()
        .iter()
        .map(|block| match block {
            Block::Thoughts(text) => {
                format!("{THOUGHTS_HEADING}\n\n{}", normalize_indentation(text))
            }
            other => normalize_indentation(&other.to_markdown()),
        })
        .filter(|section| !section.trim().is_empty())
        .collect();

    if sections.is_empty() {
        return String::new();
    }
    let mut out = sections.join("\n\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::{render_markdown, THOUGHTS_HEADING};
    use crate::answer::{Answer, Block};
    use pretty_assertions::assert_eq;

    #[test]
    fn thoughts_get_a_heading_and_text_is_normalized() {
        let answer = Answer::from(vec![
            Block::Thoughts("  weigh options".to_string()),
            Block::Text("    Indented prose\n    - list kept".to_string()),
            Block::FinishNotice("MAX_TOKENS".to_string()),
        ]);
        assert_eq!(
            render_markdown(&answer),
            format!(
                "{THOUGHTS_HEADING}\n\nweigh options\n\nIndented prose\n    - list kept\n\n\
                 > Finish reason: `MAX_TOKENS`\n"
            )
        );
    }

    #[test]
    fn code_blocks_keep_their_interior() {
        let answer = Answer::from(vec![Block::Code {
            language: "Python".to_string(),
            source: "def f():\n    return 1".to_string(),
        }]);
        assert_eq!(
            render_markdown(&answer),
            "```python\ndef f():\n    return 1\n```\n"
        );
    }

    #[test]
    fn prompt_echo_keeps_indentation_and_heading_marks() {
        let answer = Answer::prompt("Explain:\n    fn main() {}\n# not a heading");
        assert_eq!(
            render_markdown(&answer),
            "## Prompt\n\n```plaintext\nExplain:\n    fn main() {}\n# not a heading\n```\n"
        );
    }

    #[test]
    fn empty_answer_renders_nothing() {
        assert_eq!(render_markdown(&Answer::new()), "");
        assert_eq!(
            render_markdown(&Answer::from(vec![Block::Text("  \n".to_string())])),
            ""
        );
    }
}
