//! The three "current" output files and their timestamped history copies.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use answer_render::render::wrap_page;
use answer_render::{HtmlPage, RenderedOutput};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::OutputError;

pub const CURRENT_STEM: &str = "current";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Markdown,
    Ansi,
    Html,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Markdown, Format::Ansi, Format::Html];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Ansi => "ansi",
            Self::Html => "html",
        }
    }

    pub fn select(self, output: &RenderedOutput) -> &str {
        match self {
            Self::Markdown => &output.markdown,
            Self::Ansi => &output.ansi,
            Self::Html => &output.html,
        }
    }
}

/// `current.{md,ansi,html}` in one directory, rewritten every turn.
#[derive(Debug, Clone)]
pub struct CurrentFiles {
    dir: PathBuf,
}

impl CurrentFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, format: Format) -> PathBuf {
        self.dir
            .join(format!("{CURRENT_STEM}.{}", format.extension()))
    }

    /// Truncates each file and writes the prompt echo. Returns the formats that failed.
    pub fn start_turn(&self, prompt: &RenderedOutput) -> Vec<(Format, OutputError)> {
        self.write_each(prompt, false)
    }

    /// Appends the response section to each file. Returns the formats that failed.
    pub fn append_response(&self, response: &RenderedOutput) -> Vec<(Format, OutputError)> {
        self.write_each(response, true)
    }

    /// Rewrites `current.html` as a full page around the body written so far.
    pub fn finish_html_page(&self, page: &HtmlPage, title: &str) -> Result<(), OutputError> {
        let path = self.path(Format::Html);
        let body = fs::read_to_string(&path)
            .map_err(|source| OutputError::io("reading", &path, source))?;
        write_file(&path, &wrap_page(&body, title, page), false)?;
        log::debug!("wrapped {} as an HTML page", path.display());
        Ok(())
    }

    fn write_each(&self, output: &RenderedOutput, append: bool) -> Vec<(Format, OutputError)> {
        let mut failures = Vec::new();
        for format in Format::ALL {
            let path = self.path(format);
            let mut content = format.select(output).to_string();
            if append && file_has_content(&path) {
                content.insert(0, '\n');
            }
            match write_file(&path, &content, append) {
                Ok(()) => log::debug!("wrote {} bytes to {}", content.len(), path.display()),
                Err(err) => {
                    log::error!("{err}");
                    failures.push((format, err));
                }
            }
        }
        failures
    }
}

fn file_has_content(path: &Path) -> bool {
    fs::metadata(path).map(|meta| meta.len() > 0).unwrap_or(false)
}

fn write_file(path: &Path, content: &str, append: bool) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| OutputError::io("creating directory", parent, source))?;
    }
    let mut options = OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    let operation = if append { "appending to" } else { "writing" };
    let mut file = options
        .open(path)
        .map_err(|source| OutputError::io("opening", path, source))?;
    file.write_all(content.as_bytes())
        .map_err(|source| OutputError::io(operation, path, source))
}

#[must_use]
pub fn sanitize_timestamp_for_filename(timestamp: &str) -> String {
    timestamp
        .chars()
        .map(|c| match c {
            ':' | '/' | '\\' | ' ' => '-',
            _ => c,
        })
        .collect()
}

pub fn now_rfc3339() -> Result<String, OutputError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(OutputError::ClockFormat)
}

/// Copies finished output into `<dir>/<timestamp>.<ext>`.
#[derive(Debug, Clone)]
pub struct HistoryArchive {
    dir: PathBuf,
}

impl HistoryArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, timestamp: &str, format: Format) -> PathBuf {
        self.dir.join(format!(
            "{}.{}",
            sanitize_timestamp_for_filename(timestamp),
            format.extension()
        ))
    }

    pub fn archive(
        &self,
        timestamp: &str,
        format: Format,
        content: &str,
    ) -> Result<PathBuf, OutputError> {
        let path = self.path(timestamp, format);
        write_file(&path, content, false)?;
        log::debug!("archived {} to {}", format.extension(), path.display());
        Ok(path)
    }

    /// Archives the current content of every file that exists. Failures are logged and skipped.
    pub fn archive_current(&self, timestamp: &str, current: &CurrentFiles) -> Vec<PathBuf> {
        let mut written = Vec::new();
        for format in Format::ALL {
            let source = current.path(format);
            let content = match fs::read_to_string(&source) {
                Ok(content) => content,
                Err(err) => {
                    log::error!("{}", OutputError::io("reading", &source, err));
                    continue;
                }
            };
            match self.archive(timestamp, format, &content) {
                Ok(path) => written.push(path),
                Err(err) => log::error!("{err}"),
            }
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::{sanitize_timestamp_for_filename, CurrentFiles, Format, HistoryArchive};

    #[test]
    fn timestamps_are_file_name_safe() {
        assert_eq!(
            sanitize_timestamp_for_filename("2026-10-18T09:15:02.5Z"),
            "2026-10-18T09-15-02.5Z"
        );
    }

    #[test]
    fn paths_use_format_extensions() {
        let current = CurrentFiles::new("/out");
        assert_eq!(current.path(Format::Ansi).to_str(), Some("/out/current.ansi"));
        let history = HistoryArchive::new("/hist");
        assert_eq!(
            history.path("2026-10-18T09:15:02Z", Format::Html).to_str(),
            Some("/hist/2026-10-18T09-15-02Z.html")
        );
    }
}
