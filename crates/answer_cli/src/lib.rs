//! Command-line driver: reads a response, renders it, and maintains the output files.

pub mod args;
pub mod error;
pub mod output;

use std::fs::{self, File};
use std::io::{self, BufReader, Write};

use answer_render::render::page_title;
use answer_render::{
    assemble_response, render_answer, Answer, AssembleOptions, Block, DirectorySink, RenderConfig,
    ResponseContext,
};
use anyhow::Context;
use genai_response::GenerateContentResponse;

pub use args::Cli;
pub use error::OutputError;
pub use output::{CurrentFiles, Format, HistoryArchive};

pub const MEDIA_DIR: &str = "media";
pub const RESPONSE_HEADING: &str = "Response";

pub fn load_config(cli: &Cli) -> anyhow::Result<RenderConfig> {
    let config = match cli.config.as_deref() {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    let mut config = config.apply_env();
    if cli.no_thoughts {
        config.include_thoughts = false;
    }
    if cli.pure {
        config.pure_response = true;
    }
    Ok(config)
}

fn read_response(cli: &Cli) -> anyhow::Result<GenerateContentResponse> {
    if cli.response_from_stdin() {
        return GenerateContentResponse::from_reader(io::stdin().lock())
            .context("failed to read response from stdin");
    }
    let file = File::open(&cli.response)
        .with_context(|| format!("failed to open {}", cli.response.display()))?;
    GenerateContentResponse::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to read response {}", cli.response.display()))
}

fn read_prompt(cli: &Cli) -> anyhow::Result<Option<String>> {
    if let Some(prompt) = cli.prompt.as_ref() {
        return Ok(Some(prompt.clone()));
    }
    cli.prompt_file
        .as_ref()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("failed to read prompt {}", path.display()))
        })
        .transpose()
}

fn response_context(
    cli: &Cli,
    response: &GenerateContentResponse,
    generated: Option<String>,
) -> Option<ResponseContext> {
    let model = cli.model.clone().or_else(|| response.model_version.clone());
    if model.is_none() && cli.tools.is_empty() && generated.is_none() {
        return None;
    }
    Some(ResponseContext {
        model,
        tools: cli.tools.clone(),
        generated,
    })
}

/// Runs one turn: prompt echo, response section, HTML page shell, optional history copy,
/// optional print.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let response = read_response(cli)?;
    let prompt = read_prompt(cli)?;
    let timestamp = output::now_rfc3339()
        .map_err(|err| log::error!("{err}"))
        .ok();

    let options = AssembleOptions {
        include_thoughts: config.include_thoughts,
        pure: config.pure_response,
        context: response_context(cli, &response, timestamp.clone()),
    };
    let mut media = DirectorySink::new(cli.out_dir.join(MEDIA_DIR));
    let answer = assemble_response(&response, &options, &mut media);
    log::debug!(
        "assembled {} blocks from {} candidate(s)",
        answer.blocks().len(),
        response.candidates.len()
    );

    let section = if config.pure_response {
        answer
    } else {
        let mut section = Answer::from(vec![Block::Heading(RESPONSE_HEADING.to_string())]);
        section.extend(answer.into_blocks());
        section
    };

    let current = CurrentFiles::new(&cli.out_dir);
    let echo = match prompt.as_deref() {
        Some(prompt) if !config.pure_response => render_answer(&Answer::prompt(prompt), &config),
        _ => Default::default(),
    };
    current.start_turn(&echo);

    let rendered = render_answer(&section, &config);
    let failures = current.append_response(&rendered);
    if failures.len() == Format::ALL.len() {
        log::error!("no output file could be written to {}", cli.out_dir.display());
    }

    if config.html_rendering {
        let title = page_title(
            prompt.as_deref().unwrap_or(RESPONSE_HEADING),
            config.html_page.max_title_len,
        );
        if let Err(err) = current.finish_html_page(&config.html_page, &title) {
            log::error!("{err}");
        }
    }

    if let (Some(dir), Some(timestamp)) = (cli.history_dir.as_ref(), timestamp.as_deref()) {
        HistoryArchive::new(dir).archive_current(timestamp, &current);
    }

    if cli.print {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(echo.ansi.as_bytes())
            .and_then(|()| stdout.write_all(rendered.ansi.as_bytes()))
            .and_then(|()| stdout.flush())
            .context("failed to write to stdout")?;
    }
    Ok(())
}
