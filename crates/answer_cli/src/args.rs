use std::path::PathBuf;

use clap::Parser;

/// Render a generateContent response to Markdown, ANSI, and HTML files.
#[derive(Parser, Debug, Clone)]
#[command(name = "answer-render", version)]
pub struct Cli {
    /// Response JSON file, or `-` to read stdin.
    #[arg(long, short)]
    pub response: PathBuf,

    /// Prompt text echoed at the top of each output file.
    #[arg(long, conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Read the prompt echo from a file.
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// TOML render configuration.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Directory for `current.md`, `current.ansi`, `current.html`, and `media/`.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Also copy each finished file here under a timestamped name.
    #[arg(long)]
    pub history_dir: Option<PathBuf>,

    /// Leave model thoughts out of the output.
    #[arg(long)]
    pub no_thoughts: bool,

    /// Write only the answer text: no prompt echo, thoughts, sources, or footer.
    #[arg(long)]
    pub pure: bool,

    /// Model name for the footer; defaults to the response's model version.
    #[arg(long)]
    pub model: Option<String>,

    /// Active tool shown in the footer. Repeatable.
    #[arg(long = "tool")]
    pub tools: Vec<String>,

    /// Print the ANSI rendering to stdout.
    #[arg(long)]
    pub print: bool,

    /// Debug logging on stderr.
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// Whether the response is read from stdin.
    pub fn response_from_stdin(&self) -> bool {
        self.response.as_os_str() == "-"
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn defaults_and_repeatable_tools() {
        let cli = Cli::parse_from([
            "answer-render",
            "--response",
            "-",
            "--tool",
            "google_search",
            "--tool",
            "code_execution",
        ]);
        assert!(cli.response_from_stdin());
        assert_eq!(cli.out_dir, PathBuf::from("."));
        assert_eq!(cli.tools, vec!["google_search", "code_execution"]);
        assert!(!cli.no_thoughts);
        assert!(!cli.pure);
        assert!(cli.history_dir.is_none());
    }

    #[test]
    fn pure_flag_parses() {
        let cli = Cli::parse_from(["answer-render", "--response", "r.json", "--pure"]);
        assert!(cli.pure);
    }

    #[test]
    fn prompt_sources_conflict() {
        let result = Cli::try_parse_from([
            "answer-render",
            "--response",
            "r.json",
            "--prompt",
            "hi",
            "--prompt-file",
            "p.txt",
        ]);
        assert!(result.is_err());
    }
}
