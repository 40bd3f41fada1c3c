//! External program invocation.

use std::ffi::OsStr;
use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Run `program` with `args`, optionally feeding `stdin`, and return stdout.
///
/// A spawn failure or a non-zero exit becomes [`Error::Tool`] carrying the
/// spawn error or the captured stderr.
pub(crate) fn run<I, S>(program: &str, args: I, stdin: Option<&[u8]>) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let tool_error = |message: String| Error::Tool {
        tool: program.to_string(),
        message,
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

    log::debug!("Running {:?}", command);
    let mut child = command.spawn().map_err(|e| tool_error(e.to_string()))?;

    // Writer thread so a chatty child cannot block on a full stdout pipe
    let writer = match (stdin, child.stdin.take()) {
        (Some(input), Some(mut pipe)) => {
            let input = input.to_vec();
            Some(std::thread::spawn(move || pipe.write_all(&input)))
        }
        _ => None,
    };

    let output = child
        .wait_with_output()
        .map_err(|e| tool_error(e.to_string()))?;

    if let Some(writer) = writer {
        match writer.join() {
            Ok(Ok(())) => {}
            // The child may exit before reading everything; its status decides
            Ok(Err(e)) => log::debug!("{}: stdin write failed: {}", program, e),
            Err(_) => return Err(tool_error("stdin writer panicked".to_string())),
        }
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("exited with {}", output.status)
        } else {
            stderr
        };
        return Err(tool_error(message));
    }

    Ok(output.stdout)
}
