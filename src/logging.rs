//! Log sink setup.
//!
//! Everything in the workspace logs through the `log` facade; binaries call [`init`] once.
//! Output goes to stderr so rendered ANSI on stdout stays clean.

use env_logger::{Builder, Env, Target};

/// Environment variable holding an `env_logger` filter, e.g. `answer_render=debug`.
pub const LOG_ENV: &str = "ANSWER_RENDER_LOG";

/// Installs the global logger. `verbose` raises the default level from `warn` to `debug`;
/// an explicit `ANSWER_RENDER_LOG` filter always wins. Repeated calls are no-ops.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env = Env::new().filter_or(LOG_ENV, default_level);
    let _ = Builder::from_env(env)
        .target(Target::Stderr)
        .format_timestamp(None)
        .try_init();
}
