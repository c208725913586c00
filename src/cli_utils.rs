/// CLI utilities for consistent output formatting
use std::io::IsTerminal;

/// Get a colored prefix
///
/// Returns bright cyan if stderr is a TTY, plain text otherwise.
pub fn cmdcache_prefix() -> &'static str {
    if std::io::stderr().is_terminal() {
        "\x1b[96m[cmdcache]\x1b[0m"
    } else {
        "[cmdcache]"
    }
}

/// Render an error and its causes on one line: `outer: cause: root cause`
pub fn error_message(err: &anyhow::Error) -> String {
    format!("{} error: {:#}", cmdcache_prefix(), err)
}
