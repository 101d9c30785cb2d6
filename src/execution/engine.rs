//! Pipeline engine - runs the steps of a pipeline in order and traces them

use crate::{
    core::{Pipeline, Route, StepPlan, SubstitutionContext},
    execution::{
        console::Console,
        error::RunError,
        runner::{InputBinding, OutputBinding, RunOutcome, RunStatus, StepRunner},
        shell::ShellCommand,
    },
};
use console::{style, Emoji};
use std::fs::File;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

static PASS: Emoji<'_, '_> = Emoji("√", "v");
static FAIL: Emoji<'_, '_> = Emoji("×", "x");

const FALLBACK_SEPARATOR_WIDTH: usize = 20;

/// What happened to one attempted step
#[derive(Debug)]
pub struct StepReport {
    /// Zero-based position
    pub index: usize,
    /// Rendered command line, or the raw template when rendering failed
    pub command: String,
    pub result: Result<RunOutcome, RunError>,
}

impl StepReport {
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.is_success())
    }
}

/// Result of a pipeline run
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Attempted steps; the run stops after the first failing one
    pub steps: Vec<StepReport>,
    /// Number of steps in the pipeline
    pub total: usize,
}

impl PipelineReport {
    /// True iff every step ran and exited zero
    pub fn success(&self) -> bool {
        self.steps.len() == self.total && self.steps.iter().all(StepReport::succeeded)
    }

    /// Number of steps that were attempted
    pub fn attempted(&self) -> usize {
        self.steps.len()
    }

    /// The failing step, if any
    pub fn failure(&self) -> Option<&StepReport> {
        self.steps.iter().find(|step| !step.succeeded())
    }
}

/// Sequential, fail-fast pipeline executor
pub struct PipelineEngine {
    console: Arc<dyn Console>,
    interrupt: CancellationToken,
}

impl PipelineEngine {
    pub fn new(console: Arc<dyn Console>, interrupt: CancellationToken) -> Self {
        Self { console, interrupt }
    }

    /// Run every step of `pipeline` with templates rendered against `context`
    pub async fn run(&self, pipeline: &Pipeline, context: &SubstitutionContext) -> PipelineReport {
        let total = pipeline.len();
        let mut report = PipelineReport {
            steps: Vec::with_capacity(total),
            total,
        };

        info!("Running pipeline of {} step(s) in {}", total, pipeline.working_dir.display());

        for (index, step) in pipeline.steps.iter().enumerate() {
            let plan = pipeline.plan(index);

            let command = match context.render(&step.template) {
                Ok(line) => line,
                Err(e) => {
                    error!("Step {} could not be rendered: {}", index + 1, e);
                    self.trace_start(index, total, &step.template);
                    let step_report = StepReport {
                        index,
                        command: step.template.clone(),
                        result: Err(e.into()),
                    };
                    self.trace_result(&step_report);
                    self.trace_failure(&step_report, total);
                    report.steps.push(step_report);
                    break;
                }
            };

            self.trace_start(index, total, &command);

            let result = if self.interrupt.is_cancelled() {
                debug!("Interrupted before step {}, not spawning", index + 1);
                Ok(RunOutcome {
                    status: RunStatus::Cancelled { code: None },
                    elapsed: Duration::ZERO,
                })
            } else {
                if plan.is_last {
                    self.separator();
                }
                let result = self.run_step(pipeline, &plan, &command).await;
                if plan.is_last {
                    self.separator();
                }
                result
            };

            let step_report = StepReport {
                index,
                command,
                result,
            };
            self.trace_result(&step_report);

            let succeeded = step_report.succeeded();
            if !succeeded {
                self.trace_failure(&step_report, total);
            }
            report.steps.push(step_report);
            if !succeeded {
                break;
            }
        }

        if report.success() {
            info!("Pipeline succeeded");
        } else {
            warn!(
                "Pipeline failed after {}/{} step(s)",
                report.attempted(),
                report.total
            );
        }
        report
    }

    async fn run_step(
        &self,
        pipeline: &Pipeline,
        plan: &StepPlan,
        command: &str,
    ) -> Result<RunOutcome, RunError> {
        let stdin = match plan.stdin {
            Route::Console => InputBinding::Console,
            Route::File => {
                let path = &pipeline.data_files.as_ref().ok_or(RunError::MissingDataFiles)?.input;
                let file = File::open(path).map_err(|source| RunError::DataFile {
                    path: path.clone(),
                    source,
                })?;
                InputBinding::File(file)
            }
        };

        let stdout = match plan.stdout {
            Route::Console => OutputBinding::Console,
            Route::File => {
                let path = &pipeline.data_files.as_ref().ok_or(RunError::MissingDataFiles)?.output;
                let file = File::create(path).map_err(|source| RunError::DataFile {
                    path: path.clone(),
                    source,
                })?;
                OutputBinding::File(file)
            }
        };

        let shell = ShellCommand::new(command, pipeline.shell.as_deref());
        let mut runner = StepRunner::new(plan.time_limit);
        runner.start(&shell, &pipeline.working_dir, stdin, stdout)?;
        runner.await_completion(&self.interrupt).await
    }

    fn trace_start(&self, index: usize, total: usize, command: &str) {
        self.console
            .write(&format!("({}/{}) {}", index + 1, total, style(command).bold()));
    }

    fn trace_result(&self, step: &StepReport) {
        let elapsed = match &step.result {
            Ok(outcome) => outcome.elapsed.as_secs_f64(),
            Err(_) => 0.0,
        };
        let glyph = if step.succeeded() {
            style(PASS.to_string()).green()
        } else {
            style(FAIL.to_string()).red()
        };
        self.console.write(&format!("   -> {} {:.3}s", glyph, elapsed));
    }

    fn trace_failure(&self, step: &StepReport, total: usize) {
        let mut message = format!("({}/{}) {} -> ", step.index + 1, total, step.command);
        match &step.result {
            Ok(outcome) => {
                match outcome.exit_code() {
                    Some(code) => message.push_str(&code.to_string()),
                    None => message.push('?'),
                }
                if outcome.is_timeout() {
                    message.push_str(" Time out");
                }
            }
            Err(e) => {
                error!("Step {} failed: {}", step.index + 1, e);
                message.push_str(&e.to_string());
            }
        }
        self.console.error(&message);
    }

    fn separator(&self) {
        let width = term_size::dimensions_stdout()
            .map(|(w, _)| w)
            .unwrap_or(FALLBACK_SEPARATOR_WIDTH);
        self.console.write(&"-".repeat(width));
    }
}
