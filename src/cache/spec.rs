/// Commands file parsing
///
/// One command per line, split with POSIX shell word rules. Blank lines and
/// lines starting with `#` are not commands. A word starting with `#` ends the
/// command, so `show a # note` runs `show a`. The file must be valid UTF-8.
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{CacheError, Result};

/// A single tokenized command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    argv: Vec<String>,
    line: usize,
}

impl CommandLine {
    /// Program name as written in the commands file (`argv[0]`)
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// 1-based line number in the commands file
    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_words::join(&self.argv))
    }
}

/// Ordered list of commands loaded from a commands file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    commands: Vec<CommandLine>,
}

impl CommandSpec {
    /// Read and tokenize the commands file at `path`
    ///
    /// Contents that are not valid UTF-8 fail with [`CacheError::ReadCommands`].
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| CacheError::ReadCommands {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(path, &contents)
    }

    /// Tokenize commands file contents. `path` is only used for error messages.
    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        let mut commands = Vec::new();

        for (index, text) in contents.lines().enumerate() {
            let line = index + 1;
            let trimmed = text.trim_start();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let argv = shell_words::split(text).map_err(|source| CacheError::Parse {
                path: path.to_path_buf(),
                line,
                source,
            })?;

            // program() indexes argv[0]
            if argv.is_empty() {
                continue;
            }

            commands.push(CommandLine { argv, line });
        }

        Ok(Self { commands })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommandLine> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<'a> IntoIterator for &'a CommandSpec {
    type Item = &'a CommandLine;
    type IntoIter = std::slice::Iter<'a, CommandLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
