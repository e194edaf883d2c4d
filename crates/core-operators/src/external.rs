//! Filter selections through an external program.
//!
//! Every selection gets its own child process, all running at once. The
//! buffer is only touched after the last child exited; if any child fails
//! to start, the operator is cancelled and nothing is edited.

use crate::error::{OperatorError, Outcome};
use crate::operator::Operator;
use crate::session::Session;
use core_events::OperatorEvent;
use std::io;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

/// Run `command args..` once per input, feeding the input on stdin. Output
/// `i` is the stdout of the child fed `inputs[i]`, `None` when it printed
/// nothing. Fails when any child cannot be spawned.
pub async fn run_filters(
    command: &str,
    args: &[String],
    inputs: Vec<String>,
) -> io::Result<Vec<Option<String>>> {
    // spawn everything before waiting so one bad command leaves no edits
    let mut children = Vec::with_capacity(inputs.len());
    for input in inputs {
        let child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        children.push((child, input));
    }
    debug!(target: "operator.external", command, processes = children.len(), "spawned");

    let mut set = JoinSet::new();
    for (idx, (mut child, input)) in children.into_iter().enumerate() {
        let stdin = child.stdin.take();
        set.spawn(async move {
            // stdout drains while stdin is fed, or a full pipe stalls both ends
            let feed = async move {
                if let Some(mut stdin) = stdin
                    && let Err(e) = stdin.write_all(input.as_bytes()).await
                {
                    trace!(target: "operator.external", idx, error = %e, "stdin_closed_early");
                }
            };
            let ((), output) = tokio::join!(feed, child.wait_with_output());
            (idx, output)
        });
    }

    let mut outputs = vec![None; set.len()];
    while let Some(joined) = set.join_next().await {
        let (idx, output) = joined.map_err(io::Error::other)?;
        let output = output?;
        trace!(target: "operator.external", idx, status = %output.status, bytes = output.stdout.len(), "exited");
        if !output.stdout.is_empty() {
            outputs[idx] = Some(String::from_utf8_lossy(&output.stdout).into_owned());
        }
    }
    Ok(outputs)
}

impl Session {
    pub(crate) async fn execute_external(&mut self, op: &mut Operator) -> Outcome {
        let (command, args) = match op.external.clone() {
            Some(cfg) => (cfg.command, cfg.args),
            None => {
                let line = self.read_input(op).unwrap_or_default();
                let mut words = line.split_whitespace().map(String::from);
                let Some(command) = words.next() else {
                    self.cancel(op);
                    return Outcome::Cancelled;
                };
                (command, words.collect())
            }
        };
        if !self.select_target(op) {
            self.finish_no_op(op);
            return Outcome::NoOp;
        }
        let inputs: Vec<String> = (0..self.editor.selections().len())
            .map(|i| self.editor.selected_text(i))
            .collect();
        match run_filters(&command, &args, inputs).await {
            Ok(outputs) => {
                op.outputs = outputs;
                self.apply_to_selections(op, Self::transform_selection)
            }
            Err(e) => {
                warn!(target: "operator.external", command = %command, error = %e, "spawn_failed");
                self.events.emit(OperatorEvent::ExternalCommandFailed {
                    command,
                    error: e.to_string(),
                });
                self.cancel(op);
                Outcome::Cancelled
            }
        }
    }

    /// Synchronous entry: drives the filters on a private current-thread
    /// runtime. Inside a runtime callers must use `Session::run_async`.
    pub(crate) fn execute_external_blocking(
        &mut self,
        op: &mut Operator,
    ) -> Result<Outcome, OperatorError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(OperatorError::Runtime(io::Error::other(
                "already inside a tokio runtime, use run_async",
            )));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(self.execute_external(op)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn outputs_keep_input_order() {
        let outputs = run_filters("cat", &[], vec!["one".into(), String::new(), "three".into()])
            .await
            .unwrap();
        assert_eq!(outputs, vec![Some("one".to_string()), None, Some("three".to_string())]);
    }

    #[tokio::test]
    async fn large_input_streams_through_the_filter() {
        let input = "x".repeat(1 << 20);
        let outputs = run_filters("cat", &[], vec![input.clone(), input.clone()])
            .await
            .unwrap();
        assert_eq!(outputs.len(), 2);
        for output in outputs {
            assert_eq!(output.map(|o| o.len()), Some(input.len()));
        }
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let err = run_filters("oxop-no-such-program", &[], vec!["x".into()])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
