//! Builder for executing external tool commands with cooperative cancellation.
//!
//! Every tool invocation is a blocking call. While the child runs, the caller's
//! [`CancelToken`] is polled; once it is cancelled the child is killed and the
//! call returns [`Error::Cancelled`].

use crate::{CancelToken, Error, Result};
use std::ffi::OsString;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often a running child is polled for exit or cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Where the child's standard output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Share the terminal with the parent.
    #[default]
    Inherit,
    /// Send stdout to the null device, keep stderr on the terminal.
    Discard,
    /// Capture stdout and stderr.
    Capture,
}

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8, empty unless capturing).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8, empty unless capturing).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use seqforge_av::{CancelToken, ToolCommand};
///
/// let cancel = CancelToken::new();
/// let output = ToolCommand::new("tar")
///     .arg("-tf")
///     .arg("/data/batch_01.tar")
///     .capture()
///     .execute(&cancel)?;
/// println!("{}", output.stdout);
/// # Ok::<(), seqforge_av::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    output: OutputMode,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            output: OutputMode::Inherit,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<OsString>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<OsString>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Run the child from this working directory.
    pub fn current_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Discard standard output.
    pub fn discard_stdout(&mut self) -> &mut Self {
        self.output = OutputMode::Discard;
        self
    }

    /// Capture standard output and error into the returned [`ToolOutput`].
    pub fn capture(&mut self) -> &mut Self {
        self.output = OutputMode::Capture;
        self
    }

    /// Program file name, used in errors and logs.
    pub fn name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Human-readable command line.
    pub fn display(&self) -> String {
        let mut line = self.program.to_string_lossy().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    fn build(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }
        match self.output {
            OutputMode::Inherit => {}
            OutputMode::Discard => {
                cmd.stdout(Stdio::null());
            }
            OutputMode::Capture => {
                cmd.stdout(Stdio::piped());
                cmd.stderr(Stdio::piped());
            }
        }
        cmd
    }

    fn spawn(&self, cmd: &mut Command) -> Result<Child> {
        cmd.spawn()
            .map_err(|e| Error::tool_failed(self.name(), None, format!("failed to spawn: {e}")))
    }

    /// Run the command to completion and return its output, whatever the
    /// exit status.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolFailed`] if the process cannot be spawned.
    /// - [`Error::Cancelled`] if `cancel` fires before the process exits.
    pub fn run(&self, cancel: &CancelToken) -> Result<ToolOutput> {
        let name = self.name();
        if cancel.is_cancelled() {
            return Err(Error::cancelled(name));
        }

        tracing::debug!("Running: {}", self.display());
        let mut child = self.spawn(&mut self.build())?;
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = wait_child(&mut child, &name, cancel)?;

        Ok(ToolOutput {
            status,
            stdout: collect(stdout),
            stderr: collect(stderr),
        })
    }

    /// Run the command and only report its exit status.
    pub fn status(&self, cancel: &CancelToken) -> Result<ExitStatus> {
        self.run(cancel).map(|output| output.status)
    }

    /// Execute the command, treating a non-zero exit as an error.
    ///
    /// # Errors
    ///
    /// Everything [`ToolCommand::run`] returns, plus [`Error::ToolFailed`]
    /// carrying the exit code when the process exits unsuccessfully.
    pub fn execute(&self, cancel: &CancelToken) -> Result<ToolOutput> {
        let output = self.run(cancel)?;
        if !output.status.success() {
            return Err(failure(&self.name(), &output));
        }
        Ok(output)
    }
}

/// Two commands joined by a pipe: `producer | consumer`.
///
/// The producer's stdout feeds the consumer's stdin; the consumer's own
/// [`OutputMode`] decides what happens to its output.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    producer: &'a ToolCommand,
    consumer: &'a ToolCommand,
}

impl<'a> Pipeline<'a> {
    pub fn new(producer: &'a ToolCommand, consumer: &'a ToolCommand) -> Self {
        Self { producer, consumer }
    }

    pub fn display(&self) -> String {
        format!("{} | {}", self.producer.display(), self.consumer.display())
    }

    /// Execute both stages; a non-zero exit of either is an error, the
    /// producer's failure taking precedence.
    ///
    /// Returns the consumer's output.
    pub fn execute(&self, cancel: &CancelToken) -> Result<ToolOutput> {
        let producer_name = self.producer.name();
        let consumer_name = self.consumer.name();
        if cancel.is_cancelled() {
            return Err(Error::cancelled(producer_name));
        }

        tracing::debug!("Running: {}", self.display());

        let mut producer_cmd = self.producer.build();
        producer_cmd.stdout(Stdio::piped());
        let mut producer = self.producer.spawn(&mut producer_cmd)?;

        let pipe = match producer.stdout.take() {
            Some(pipe) => pipe,
            None => {
                let _ = producer.kill();
                let _ = producer.wait();
                return Err(Error::tool_failed(
                    producer_name,
                    None,
                    "stdout pipe unavailable",
                ));
            }
        };

        let mut consumer_cmd = self.consumer.build();
        consumer_cmd.stdin(Stdio::from(pipe));
        let mut consumer = match self.consumer.spawn(&mut consumer_cmd) {
            Ok(child) => child,
            Err(e) => {
                let _ = producer.kill();
                let _ = producer.wait();
                return Err(e);
            }
        };
        let stdout = consumer.stdout.take().map(drain);
        let stderr = consumer.stderr.take().map(drain);

        let (producer_status, consumer_status) = wait_pair(
            (&mut producer, &producer_name),
            (&mut consumer, &consumer_name),
            cancel,
        )?;

        let output = ToolOutput {
            status: consumer_status,
            stdout: collect(stdout),
            stderr: collect(stderr),
        };

        if !producer_status.success() {
            return Err(Error::tool_failed(
                producer_name,
                producer_status.code(),
                format!("exited with status {producer_status}"),
            ));
        }
        if !consumer_status.success() {
            return Err(failure(&consumer_name, &output));
        }
        Ok(output)
    }
}

fn failure(name: &str, output: &ToolOutput) -> Error {
    let stderr = output.stderr.trim();
    let message = if stderr.is_empty() {
        format!("exited with status {}", output.status)
    } else {
        format!("exited with status {}: {}", output.status, stderr)
    };
    Error::tool_failed(name, output.status.code(), message)
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|buf| String::from_utf8_lossy(&buf).to_string())
        .unwrap_or_default()
}

fn kill(child: &mut Child, name: &str) {
    tracing::warn!("Interrupted, stopping {}", name);
    let _ = child.kill();
    let _ = child.wait();
}

fn wait_child(child: &mut Child, name: &str, cancel: &CancelToken) -> Result<ExitStatus> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if cancel.is_cancelled() {
            kill(child, name);
            return Err(Error::cancelled(name));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn wait_pair(
    producer: (&mut Child, &str),
    consumer: (&mut Child, &str),
    cancel: &CancelToken,
) -> Result<(ExitStatus, ExitStatus)> {
    let (producer, producer_name) = producer;
    let (consumer, consumer_name) = consumer;
    let mut producer_status = None;
    let mut consumer_status = None;

    loop {
        if producer_status.is_none() {
            producer_status = producer.try_wait()?;
        }
        if consumer_status.is_none() {
            consumer_status = consumer.try_wait()?;
        }
        if let (Some(p), Some(c)) = (producer_status, consumer_status) {
            return Ok((p, c));
        }
        if cancel.is_cancelled() {
            if producer_status.is_none() {
                kill(producer, producer_name);
            }
            if consumer_status.is_none() {
                kill(consumer, consumer_name);
            }
            return Err(Error::cancelled(consumer_name));
        }
        thread::sleep(POLL_INTERVAL);
    }
}
