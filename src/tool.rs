use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, ReelbatchError};

/// Stderr lines kept in the diagnostic of a failed run
const DIAGNOSTIC_TAIL_LINES: usize = 20;

/// External tool invocation: binary, argument list and a short description for logs
#[derive(Debug, Clone)]
pub struct ToolCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
    /// Log output lines at INFO as they arrive instead of DEBUG
    pub echo_output: bool,
}

impl ToolCommand {
    /// Create a new tool command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
            echo_output: false,
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add a flag followed by its value
    pub fn option<S1: Into<String>, S2: Into<String>>(self, flag: S1, value: S2) -> Self {
        self.arg(flag).arg(value)
    }

    /// Add a path argument
    pub fn path<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Show the tool's progress output while it runs
    pub fn echo_output(mut self, echo: bool) -> Self {
        self.echo_output = echo;
        self
    }

    /// Name of the binary without directories, used in error reports
    pub fn tool_name(&self) -> String {
        Path::new(&self.binary_path)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.binary_path.clone())
    }

    /// Run to completion and return stdout; non-zero exit carries the stderr tail as the diagnostic
    ///
    /// Both streams are forwarded to tracing line by line while the tool runs.
    pub async fn execute(&self) -> Result<String> {
        debug!("Executing {}: {} {:?}", self.description, self.binary_path, self.args);

        let tool = self.tool_name();
        let mut child = Command::new(&self.binary_path)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ReelbatchError::ExternalTool {
                tool: tool.clone(),
                diagnostic: format!("failed to launch: {}", e),
            })?;

        let stdout = child.stdout.take()
            .ok_or_else(|| ReelbatchError::Unexpected(format!("{} stdout was not captured", tool)))?;
        let stderr = child.stderr.take()
            .ok_or_else(|| ReelbatchError::Unexpected(format!("{} stderr was not captured", tool)))?;

        let (stdout_lines, stderr_lines, status) = tokio::join!(
            forward_lines(stdout, &tool, self.echo_output),
            forward_lines(stderr, &tool, self.echo_output),
            child.wait(),
        );
        let stdout_lines = stdout_lines?;
        let stderr_lines = stderr_lines?;
        let status = status?;

        if !status.success() {
            let tail = &stderr_lines[stderr_lines.len().saturating_sub(DIAGNOSTIC_TAIL_LINES)..];
            let diagnostic = if tail.is_empty() {
                format!("{} exited with {}", self.description, status)
            } else {
                format!("{} failed: {}", self.description, tail.join("\n"))
            };
            return Err(ReelbatchError::ExternalTool { tool, diagnostic });
        }

        debug!("{} finished", self.description);
        Ok(stdout_lines.join("\n"))
    }

    /// First line of the tool's version output
    pub async fn probe_version(&self) -> Result<String> {
        let stdout = self.execute().await?;
        Ok(stdout.lines().next().unwrap_or("Unknown version").trim().to_string())
    }
}

/// Log each line of `reader` as it arrives and return the non-empty lines
///
/// Carriage returns split lines too, since progress meters redraw with `\r`.
async fn forward_lines<R: AsyncRead + Unpin>(reader: R, tool: &str, echo: bool) -> std::io::Result<Vec<String>> {
    let mut reader = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&buf);
        for line in text.split('\r').map(str::trim).filter(|l| !l.is_empty()) {
            if echo {
                info!("{}: {}", tool, line);
            } else {
                debug!("{}: {}", tool, line);
            }
            lines.push(line.to_string());
        }
    }

    Ok(lines)
}
