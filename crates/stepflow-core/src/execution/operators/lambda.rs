//! User callback step.

use crate::execution::context::ExecutionContext;
use crate::execution::error::OperatorError;
use crate::execution::step::PipelineStep;

/// The call a [`LambdaStep`] forwards to its callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LambdaOperation {
    /// A new input window starts.
    Reset,
    /// The current chunk is ready.
    Execute,
}

type Callback = Box<dyn FnMut(LambdaOperation) -> Result<(), OperatorError> + Send>;

/// Hands control to a closure on every reset and execute.
///
/// The closure typically captures column handles and reads the current
/// chunk. A failure during reset cannot be reported through `reset`, so
/// it is held and returned by the following `execute`.
pub struct LambdaStep {
    callback: Callback,
    pending: Option<OperatorError>,
}

impl LambdaStep {
    /// Creates a step calling `callback`.
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(LambdaOperation) -> Result<(), OperatorError> + Send + 'static,
    {
        Self {
            callback: Box::new(callback),
            pending: None,
        }
    }
}

impl PipelineStep for LambdaStep {
    fn prepare(&mut self, _ctx: &ExecutionContext) -> Result<(), OperatorError> {
        self.pending = None;
        Ok(())
    }

    fn reset(&mut self) {
        if let Err(err) = (self.callback)(LambdaOperation::Reset) {
            self.pending.get_or_insert(err);
        }
    }

    fn execute(&mut self) -> Result<(), OperatorError> {
        if let Some(err) = self.pending.take() {
            return Err(err);
        }
        (self.callback)(LambdaOperation::Execute)
    }

    fn is_finished(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        "Lambda".to_string()
    }
}
