/// Rebuild: run every command and tee its stdout into the cache file
///
/// Commands run one after another. Each child's stderr is inherited, so it
/// reaches the user directly and is never cached.
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::resolve::{ExecutableResolver, ResolvedCommand};
use super::spec::CommandSpec;
use super::tee::tee_copy;
use crate::error::{CacheError, Result};
use crate::logging::{operations, status};

/// What a successful rebuild did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildSummary {
    pub commands_run: usize,
    pub bytes_written: u64,
    pub duration: Duration,
}

/// Runs a command spec into a cache file
pub struct CommandExecutor<'a> {
    resolver: &'a ExecutableResolver,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(resolver: &'a ExecutableResolver) -> Self {
        Self { resolver }
    }

    /// Run every command, writing their combined stdout to `cache_path` and `output`
    ///
    /// All programs are resolved before the cache file is touched. A failure
    /// after that leaves whatever output was already written in the cache.
    pub fn rebuild<W: Write + ?Sized>(
        &self,
        spec: &CommandSpec,
        cache_path: &Path,
        output: &mut W,
    ) -> Result<RebuildSummary> {
        let start = Instant::now();
        let resolved = self.resolver.resolve_all(spec)?;

        let mut cache = File::create(cache_path).map_err(|source| CacheError::CreateCache {
            path: cache_path.to_path_buf(),
            source,
        })?;

        let mut bytes_written = 0;
        for (index, command) in resolved.iter().enumerate() {
            match self.run_one(command, &mut cache, &mut *output) {
                Ok(bytes) => bytes_written += bytes,
                Err(e) => {
                    warn!(
                        operation = operations::REBUILD,
                        status = status::ERROR,
                        cache = %cache_path.display(),
                        completed = index,
                        total = resolved.len(),
                        "rebuild aborted, cache file left partially written"
                    );
                    return Err(e);
                }
            }
        }

        let summary = RebuildSummary {
            commands_run: resolved.len(),
            bytes_written,
            duration: start.elapsed(),
        };
        let duration_ms = summary.duration.as_millis() as u64;

        info!(
            operation = operations::REBUILD,
            status = status::SUCCESS,
            cache = %cache_path.display(),
            commands = summary.commands_run,
            size_bytes = summary.bytes_written,
            duration_ms,
            "cache rebuilt"
        );

        Ok(summary)
    }

    fn run_one<W: Write + ?Sized>(
        &self,
        resolved: &ResolvedCommand<'_>,
        cache: &mut File,
        output: &mut W,
    ) -> Result<u64> {
        let command = resolved.command;
        let rendered = command.to_string();

        let mut cmd = Command::new(&resolved.executable);
        cmd.args(command.args())
            .current_dir(self.resolver.working_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.arg0(command.program());
        }

        debug!(command = %rendered, executable = %resolved.executable.display(), "spawning");

        let mut child = cmd.spawn().map_err(|source| CacheError::Spawn {
            command: rendered.clone(),
            source,
        })?;

        let mut stdout = match piped_stdout(&mut child) {
            Ok(stdout) => stdout,
            Err(source) => {
                reap(&mut child);
                return Err(CacheError::Spawn {
                    command: rendered,
                    source,
                });
            }
        };

        let copied = tee_copy(&mut stdout, cache, output);
        drop(stdout);

        let bytes = match copied {
            Ok(bytes) => bytes,
            Err(source) => {
                reap(&mut child);
                return Err(CacheError::Stream {
                    command: rendered,
                    source,
                });
            }
        };

        let exit = child.wait().map_err(|source| CacheError::Wait {
            command: rendered.clone(),
            source,
        })?;

        if !exit.success() {
            return Err(CacheError::CommandFailed {
                command: rendered,
                status: exit,
            });
        }

        debug!(command = %rendered, size_bytes = bytes, "command finished");
        Ok(bytes)
    }
}

/// Take the read end of a child's stdout pipe
fn piped_stdout(child: &mut Child) -> io::Result<ChildStdout> {
    child
        .stdout
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "stdout was not piped"))
}

/// Kill and wait a child whose output can no longer be consumed
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!(err = %e, "kill failed, child already exited");
    }
    if let Err(e) = child.wait() {
        warn!(err = %e, "failed to reap child process");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::cache::tee::TeeError;
    use crate::cache::test_support::{write_script, Workspace};
    use serial_test::serial;
    use std::fs;

    fn rebuild(workspace: &Workspace, output: &mut Vec<u8>) -> Result<RebuildSummary> {
        let config = workspace.config();
        let resolver = ExecutableResolver::from_config(&config);
        let spec = CommandSpec::load(&config.commands_file)?;
        CommandExecutor::new(&resolver).rebuild(&spec, &config.cache_file, output)
    }

    #[test]
    #[serial]
    fn test_single_command_is_teed() {
        let workspace = Workspace::new();
        write_script(workspace.bin_dir(), "abc", "printf abc");
        workspace.write_commands("abc\n");

        let mut output = Vec::new();
        let summary = rebuild(&workspace, &mut output).unwrap();

        assert_eq!(summary.commands_run, 1);
        assert_eq!(summary.bytes_written, 3);
        assert_eq!(output, b"abc");
        assert_eq!(workspace.read_cache(), b"abc");
    }

    #[test]
    #[serial]
    fn test_outputs_concatenate_in_order() {
        let workspace = Workspace::new();
        write_script(workspace.bin_dir(), "emit-a", "printf A");
        write_script(workspace.bin_dir(), "emit-b", "printf B");
        workspace.write_commands("emit-a\nemit-b\n");

        let mut output = Vec::new();
        rebuild(&workspace, &mut output).unwrap();

        assert_eq!(output, b"AB");
        assert_eq!(workspace.read_cache(), b"AB");
    }

    #[test]
    #[serial]
    fn test_arguments_are_passed_through() {
        let workspace = Workspace::new();
        write_script(workspace.bin_dir(), "show-args", r#"printf '[%s]' "$@""#);
        workspace.write_commands("show-args one \"two words\" 'three'\n");

        let mut output = Vec::new();
        rebuild(&workspace, &mut output).unwrap();

        assert_eq!(output, b"[one][two words][three]");
    }

    #[test]
    #[serial]
    fn test_stderr_is_not_cached() {
        let workspace = Workspace::new();
        write_script(workspace.bin_dir(), "noisy", "printf out; printf err >&2");
        workspace.write_commands("noisy\n");

        let mut output = Vec::new();
        rebuild(&workspace, &mut output).unwrap();

        assert_eq!(workspace.read_cache(), b"out");
    }

    #[test]
    #[serial]
    fn test_rebuild_truncates_existing_cache() {
        let workspace = Workspace::new();
        write_script(workspace.bin_dir(), "short", "printf new");
        workspace.write_commands("short\n");
        workspace.write_cache(b"a much longer stale cache");

        let mut output = Vec::new();
        rebuild(&workspace, &mut output).unwrap();

        assert_eq!(workspace.read_cache(), b"new");
    }

    #[test]
    #[serial]
    fn test_failing_command_aborts_remaining() {
        let workspace = Workspace::new();
        let marker = workspace.path().join("third-ran");
        write_script(workspace.bin_dir(), "first", "printf first");
        write_script(workspace.bin_dir(), "fails", "printf partial; exit 3");
        write_script(
            workspace.bin_dir(),
            "third",
            &format!("touch '{}'", marker.display()),
        );
        workspace.write_commands("first\nfails\nthird\n");

        let mut output = Vec::new();
        let err = rebuild(&workspace, &mut output).unwrap_err();

        match err {
            CacheError::CommandFailed { command, status } => {
                assert_eq!(command, "fails");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
        assert!(!marker.exists());
        // Partial output stays in the cache
        assert_eq!(workspace.read_cache(), b"firstpartial");
    }

    #[test]
    #[serial]
    fn test_missing_executable_leaves_cache_untouched() {
        let workspace = Workspace::new();
        write_script(workspace.bin_dir(), "present", "printf ok");
        workspace.write_commands("present\nabsent\n");

        let mut output = Vec::new();
        let err = rebuild(&workspace, &mut output).unwrap_err();

        assert!(matches!(err, CacheError::CommandNotFound { .. }));
        assert!(!workspace.cache_file().exists());
        assert!(output.is_empty());

        workspace.write_cache(b"previous");
        rebuild(&workspace, &mut output).unwrap_err();
        assert_eq!(fs::read(workspace.cache_file()).unwrap(), b"previous");
    }

    #[test]
    #[serial]
    fn test_empty_spec_creates_empty_cache() {
        let workspace = Workspace::new();
        workspace.write_commands("# nothing to run\n");

        let mut output = Vec::new();
        let summary = rebuild(&workspace, &mut output).unwrap();

        assert_eq!(summary.commands_run, 0);
        assert!(workspace.cache_file().exists());
        assert!(workspace.read_cache().is_empty());
    }

    /// Output sink that rejects every write, like a closed terminal pipe
    struct ClosedOutput;

    impl Write for ClosedOutput {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    #[serial]
    fn test_output_failure_kills_running_command() {
        let workspace = Workspace::new();
        let marker = workspace.path().join("second-ran");
        write_script(workspace.bin_dir(), "slow", "printf start\nexec sleep 30");
        write_script(
            workspace.bin_dir(),
            "second",
            &format!("touch '{}'", marker.display()),
        );
        workspace.write_commands("slow\nsecond\n");

        let config = workspace.config();
        let resolver = ExecutableResolver::from_config(&config);
        let spec = CommandSpec::load(&config.commands_file).unwrap();

        let start = Instant::now();
        let err = CommandExecutor::new(&resolver)
            .rebuild(&spec, &config.cache_file, &mut ClosedOutput)
            .unwrap_err();

        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(matches!(
            err,
            CacheError::Stream {
                source: TeeError::Output(_),
                ..
            }
        ));
        assert!(!marker.exists());
        // The chunk reached the cache before the output write failed
        assert_eq!(workspace.read_cache(), b"start");
    }

    #[test]
    fn test_piped_stdout_requires_a_pipe() {
        let mut child = Command::new("/bin/sh")
            .args(["-c", "exit 0"])
            .stdout(Stdio::null())
            .spawn()
            .unwrap();

        let err = piped_stdout(&mut child).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        child.wait().unwrap();
    }
}
