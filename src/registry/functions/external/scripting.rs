//! SCRIPTING(path, args...) - run an external script and capture its output

use crate::config::ScriptingConfig;
use crate::registry::function::{
    EvaluationContext, ExpressionFunction, FunctionError, FunctionResult, arg,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo};
use log::{debug, error};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

const NAME: &str = "SCRIPTING";

fn script_error(message: impl Into<String>) -> FunctionError {
    FunctionError::Script {
        name: NAME.to_string(),
        message: message.into(),
    }
}

/// Read a pipe to completion on its own thread, delivering the text once
/// the pipe closes
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Collect drained output before `deadline`.
///
/// Processes left behind by the script may keep the pipe open after it
/// exited; their reader thread is abandoned when the deadline passes.
fn collect(output: &Receiver<String>, deadline: Instant) -> Result<String, RecvTimeoutError> {
    match output.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Err(RecvTimeoutError::Disconnected) => Ok(String::new()),
        result => result,
    }
}

fn timed_out(script: &str, timeout: Duration) -> FunctionError {
    script_error(format!(
        "{script} timed out after {} ms",
        timeout.as_millis()
    ))
}

/// Run `script` with positional `args` and return its trimmed stdout.
///
/// The interpreter is chosen by file extension. A missing file, an
/// unsupported extension, a non-zero exit status or exceeding the timeout is
/// an error; the child is killed on timeout. The timeout also bounds reading
/// its output.
pub fn run_script(script: &str, args: &[String], config: &ScriptingConfig) -> FunctionResult<String> {
    if !config.enabled {
        return Err(FunctionError::Unsupported {
            name: NAME.to_string(),
            message: "script execution is disabled".to_string(),
        });
    }

    let path = Path::new(script);
    if script.is_empty() || !path.is_file() {
        return Err(script_error(format!("script not found: {script}")));
    }
    let Some(prefix) = config.interpreter_for(path) else {
        return Err(script_error(format!("unsupported script type: {script}")));
    };

    let mut command = match prefix.split_first() {
        Some((program, rest)) => {
            let mut command = Command::new(program);
            command.args(rest).arg(path);
            command
        }
        None => Command::new(path),
    };
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("Running script {script} with {} argument(s)", args.len());
    let timeout = config.timeout();
    let deadline = Instant::now() + timeout;
    let mut child = command
        .spawn()
        .map_err(|e| script_error(format!("failed to start {script}: {e}")))?;
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(timed_out(script, timeout));
        }
        Err(e) => {
            let _ = child.kill();
            return Err(script_error(format!("waiting for {script} failed: {e}")));
        }
    };

    let stdout = collect(&stdout, deadline).map_err(|_| timed_out(script, timeout))?;
    let stderr = collect(&stderr, deadline).map_err(|_| timed_out(script, timeout))?;
    if !status.success() {
        return Err(script_error(format!(
            "{script} exited with {status}: {}",
            stderr.trim()
        )));
    }
    Ok(stdout.trim().to_string())
}

/// SCRIPTING(path, args...) - trimmed standard output of an external script
pub struct ScriptingFunction;

impl ExpressionFunction for ScriptingFunction {
    fn name(&self) -> &str {
        NAME
    }
    fn human_friendly_name(&self) -> &str {
        "Scripting"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::variadic(
                NAME,
                vec![
                    ParameterInfo::required("path"),
                    ParameterInfo::optional("args"),
                ],
            )
        });
        &SIG
    }
    fn documentation(&self) -> &str {
        "Runs the script at `path` with the remaining arguments and returns its trimmed \
         standard output. Failures, non-zero exit codes and timeouts yield an empty string."
    }
    fn evaluate(&self, args: &[String], context: &EvaluationContext<'_>) -> FunctionResult<String> {
        let script = arg(args, 0);
        run_script(script, args.get(1..).unwrap_or_default(), context.scripting).inspect_err(
            |e| {
                if !matches!(e, FunctionError::Unsupported { .. }) {
                    error!("{e}");
                }
            },
        )
    }
}
