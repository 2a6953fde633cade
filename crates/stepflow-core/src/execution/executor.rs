//! The pipeline executor.
//!
//! A run is a walk over the step array driven by two operations:
//!
//! ```text
//! ACTIVATE(i): Start       -> done
//!              otherwise   -> reset(i), execute(i), ACTIVATE(i + 1)
//!              End         -> RETURN(i - 1)
//! RETURN(i):   Start       -> done
//!              finished(i) -> RETURN(i - 1)
//!              otherwise   -> execute(i), ACTIVATE(i + 1)
//! ```
//!
//! Each step pulls exactly as many chunks from upstream as it needs and
//! the executor keeps no per-step buffers. The recursion is unrolled into
//! a loop over an instruction pointer and a phase, and the action for a
//! step is looked up in the [`DispatchTables`].

use std::time::Instant;

use super::context::ExecutionContext;
use super::dispatch::{ActivateTarget, DispatchTableBuilder, DispatchTables, Phase, ReturnTarget};
use super::error::{ExecutionError, OperatorError};
use super::pipeline::Pipeline;
use super::stats::RunStats;
use super::step::{PipelineStep, Step};

/// Runs pipelines to completion.
///
/// An executor holds no per-run state and can be reused and shared.
#[derive(Debug, Clone, Copy)]
pub struct Executor {
    tables: DispatchTables,
}

impl Executor {
    /// Creates an executor over the process-wide dispatch tables.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: *DispatchTables::global(),
        }
    }

    /// Creates an executor over custom dispatch tables.
    #[must_use]
    pub fn with_tables(tables: DispatchTables) -> Self {
        Self { tables }
    }

    /// Builds the tables registered in `builder` and creates an executor
    /// over them.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::DispatchTable`] if the registration is
    /// incomplete or routes a sentinel off the step array.
    pub fn try_from_builder(builder: &DispatchTableBuilder) -> Result<Self, ExecutionError> {
        let tables = builder.build()?;
        Ok(Self::with_tables(tables))
    }

    /// Runs `pipeline` against `ctx`.
    ///
    /// The pipeline shape and configuration are validated first; nothing
    /// is prepared if either is invalid. Every step is then prepared in
    /// order and the pipeline is driven until control returns to `Start`.
    ///
    /// # Errors
    ///
    /// Returns the first configuration or step error, or
    /// [`ExecutionError::Cancelled`] / [`ExecutionError::IterationLimit`].
    /// Column contents are unspecified after a failed run.
    pub fn run(
        &self,
        ctx: &ExecutionContext,
        pipeline: &mut Pipeline,
    ) -> Result<RunStats, ExecutionError> {
        let span = tracing::debug_span!(
            "pipeline.run",
            steps = pipeline.len(),
            chunk_size = ctx.chunk_size()
        );
        let _guard = span.enter();

        ctx.config().validate()?;
        pipeline.validate()?;

        let started = Instant::now();
        let mut stats = RunStats::for_kinds(pipeline.kinds());
        let steps = pipeline.steps_mut();

        for (index, step) in steps.iter_mut().enumerate() {
            step.prepare(ctx)
                .map_err(|source| operator_error(index, step, source))?;
        }
        tracing::debug!("prepared {} steps", steps.len());

        let result = self.drive(ctx, steps, &mut stats);
        stats.elapsed = started.elapsed();

        match result {
            Ok(()) => {
                tracing::debug!(
                    iterations = stats.iterations,
                    elapsed_us = stats.elapsed.as_micros() as u64,
                    "pipeline finished"
                );
                Ok(stats)
            }
            Err(e) => {
                tracing::warn!("pipeline aborted: {}", e);
                Err(e)
            }
        }
    }

    fn drive(
        &self,
        ctx: &ExecutionContext,
        steps: &mut [Step],
        stats: &mut RunStats,
    ) -> Result<(), ExecutionError> {
        let max_iterations = ctx.config().max_iterations;
        let len = steps.len();
        let mut ip = 1;
        let mut phase = Phase::Activate;

        loop {
            if ctx.is_cancelled() {
                return Err(ExecutionError::Cancelled);
            }
            if let Some(limit) = max_iterations {
                if stats.iterations >= limit {
                    return Err(ExecutionError::IterationLimit(limit));
                }
            }
            stats.iterations += 1;

            let Some(step) = steps.get_mut(ip) else {
                return Err(ExecutionError::ControlFlow { step: ip });
            };
            let kind = step.kind();
            tracing::trace!(ip, %kind, ?phase, "dispatch");

            match phase {
                Phase::Activate => match self.tables.activate(kind) {
                    ActivateTarget::Terminate => return Ok(()),
                    ActivateTarget::BeginReturn => {
                        phase = Phase::Return;
                        ip = upstream(ip)?;
                    }
                    ActivateTarget::Execute => {
                        step.reset();
                        stats.steps[ip].resets += 1;
                        step.execute()
                            .map_err(|source| operator_error(ip, step, source))?;
                        stats.steps[ip].executions += 1;
                        ip = downstream(ip, len)?;
                    }
                },
                Phase::Return => match self.tables.on_return(kind) {
                    ReturnTarget::Terminate => return Ok(()),
                    ReturnTarget::PassUpstream => ip = upstream(ip)?,
                    ReturnTarget::Resume => {
                        if step.is_finished() {
                            ip = upstream(ip)?;
                        } else {
                            step.execute()
                                .map_err(|source| operator_error(ip, step, source))?;
                            stats.steps[ip].executions += 1;
                            phase = Phase::Activate;
                            ip = downstream(ip, len)?;
                        }
                    }
                },
            }
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

fn upstream(ip: usize) -> Result<usize, ExecutionError> {
    ip.checked_sub(1)
        .ok_or(ExecutionError::ControlFlow { step: ip })
}

fn downstream(ip: usize, len: usize) -> Result<usize, ExecutionError> {
    ip.checked_add(1)
        .filter(|&next| next < len)
        .ok_or(ExecutionError::ControlFlow { step: ip })
}

fn operator_error(index: usize, step: &Step, source: OperatorError) -> ExecutionError {
    ExecutionError::Operator {
        step: index,
        kind: step.kind(),
        source,
    }
}
