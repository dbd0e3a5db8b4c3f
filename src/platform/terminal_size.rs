//! Output-width discovery for ANSI rendering.

/// Columns left free at the right edge of the terminal.
pub const WIDTH_MARGIN: usize = 4;
/// Narrowest width rendered, and the width used when no terminal is attached.
pub const MIN_WIDTH: usize = 80;

/// Columns of the terminal attached to stdout (falling back to stderr), if any.
#[cfg(unix)]
pub fn terminal_columns() -> Option<usize> {
    [libc::STDOUT_FILENO, libc::STDERR_FILENO]
        .into_iter()
        .find_map(read_winsize_columns)
}

#[cfg(not(unix))]
pub fn terminal_columns() -> Option<usize> {
    None
}

#[cfg(unix)]
fn read_winsize_columns(fd: libc::c_int) -> Option<usize> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 {
        Some(usize::from(size.ws_col))
    } else {
        None
    }
}

/// Picks the ANSI wrap width: a configured width wins, otherwise the detected terminal width
/// minus [`WIDTH_MARGIN`], never below [`MIN_WIDTH`].
pub fn resolve_width(configured: Option<usize>, detected: Option<usize>) -> usize {
    if let Some(width) = configured.filter(|width| *width > 0) {
        return width;
    }
    detected
        .map(|columns| columns.saturating_sub(WIDTH_MARGIN).max(MIN_WIDTH))
        .unwrap_or(MIN_WIDTH)
}
