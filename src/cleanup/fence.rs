/// Removes spaces between a newline and a following ```` ``` ```` marker.
///
/// This is a raw character scan with no Markdown awareness, so it is only applied to individual
/// response text parts.
pub fn dedent_fence_markers(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(newline) = rest.find('\n') {
        out.push_str(&rest[..=newline]);
        rest = &rest[newline + 1..];

        let after_spaces = rest.trim_start_matches(' ');
        if after_spaces.starts_with("```") {
            rest = after_spaces;
        }
    }

    out.push_str(rest);
    out
}
