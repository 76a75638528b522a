use std::time::{Duration, Instant};

use log::{error, info};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    step::{Step, StepExecution},
};

/// Type alias for job execution results.
///
/// A `JobResult` is a `Result` that contains either:
/// - A successful `JobExecution` with execution details
/// - A `BatchError` naming the step that failed
type JobResult<T> = Result<T, BatchError>;

/// Terminal status of a job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every step ended successfully.
    Completed,
    /// A step failed; the remaining steps were not run.
    Failed,
}

/// Represents a job that can be executed.
///
/// A job is a container for a sequence of steps that are executed in order.
/// It is responsible for orchestrating the steps and reporting the overall
/// result.
pub trait Job {
    /// Runs the job and returns the result of the job execution.
    ///
    /// # Returns
    /// - `Ok(JobExecution)` when every step succeeded
    /// - `Err(BatchError::Step)` when a step failed
    fn run(&self) -> JobResult<JobExecution>;
}

/// Represents the execution of a job.
#[derive(Debug, Clone)]
pub struct JobExecution {
    pub id: Uuid,
    pub name: String,
    pub status: BatchStatus,
    /// The time when the job started executing
    pub start: Instant,
    /// The time when the job finished executing
    pub end: Instant,
    /// The total duration of the job execution
    pub duration: Duration,
    /// One entry per step that was started, in execution order
    pub step_executions: Vec<StepExecution>,
}

impl JobExecution {
    pub fn get_step_execution(&self, name: &str) -> Option<&StepExecution> {
        self.step_executions.iter().find(|execution| execution.name == name)
    }
}

/// Callback invoked once the job reached its terminal status.
type AfterJob<'a> = Box<dyn Fn(&JobExecution) + 'a>;

/// Represents an instance of a job.
///
/// A job instance is created through the `JobBuilder` and executed by calling
/// the `run` method. The steps are executed in the order they were added, and
/// the `after_job` callbacks run once every step ended or one failed.
pub struct JobInstance<'a> {
    /// Unique identifier for this job instance
    id: Uuid,
    /// Human-readable name for the job
    name: String,
    /// Collection of steps that make up this job, in execution order
    steps: Vec<&'a dyn Step>,
    listeners: Vec<AfterJob<'a>>,
}

impl Job for JobInstance<'_> {
    fn run(&self) -> JobResult<JobExecution> {
        let start = Instant::now();

        info!("Start of job: {}, id: {}", self.name, self.id);

        let mut step_executions = Vec::with_capacity(self.steps.len());
        let mut failed_step = None;

        for step in &self.steps {
            let mut step_execution = StepExecution::new(step.get_name());
            let result = step.execute(&mut step_execution);
            step_executions.push(step_execution);

            if let Err(err) = result {
                error!("Step {} of job {} failed: {}", step.get_name(), self.name, err);
                failed_step = Some(step.get_name().to_owned());
                break;
            }
        }

        let status = if failed_step.is_some() {
            BatchStatus::Failed
        } else {
            BatchStatus::Completed
        };

        let job_execution = JobExecution {
            id: self.id,
            name: self.name.clone(),
            status,
            start,
            end: Instant::now(),
            duration: start.elapsed(),
            step_executions,
        };

        info!(
            "End of job: {}, id: {}, status: {:?}, duration: {:?}",
            self.name, self.id, status, job_execution.duration
        );

        for listener in &self.listeners {
            listener(&job_execution);
        }

        match failed_step {
            None => Ok(job_execution),
            Some(step_name) => Err(BatchError::Step(step_name)),
        }
    }
}

/// Builder for creating a job instance.
///
/// # Example
///
/// The `after_job` callbacks run once the job reached its terminal status,
/// whether it completed or failed.
///
/// ```
/// use std::cell::Cell;
///
/// use ch_import::company::Company;
/// use ch_import::core::job::{BatchStatus, Job, JobBuilder};
/// use ch_import::core::step::StepBuilder;
/// use ch_import::item::csv::csv_reader::CsvItemReaderBuilder;
/// use ch_import::item::json::json_writer::JsonItemWriterBuilder;
///
/// # fn main() -> Result<(), ch_import::BatchError> {
/// let reader = CsvItemReaderBuilder::new()
///     .included_fields(&[0, 1])
///     .names(&["companyName", "companyNumber"])
///     .from_reader("Acme Ltd,001\n".as_bytes());
/// let writer = JsonItemWriterBuilder::new().from_writer(Vec::new());
///
/// let step = StepBuilder::new("import")
///     .chunk::<Company>(100)
///     .reader(&reader)
///     .writer(&writer)
///     .build()?;
///
/// let observed = Cell::new(None);
/// let job = JobBuilder::new()
///     .name("import-companies".to_string())
///     .start(&step)
///     .after_job(|execution| observed.set(Some(execution.status)))
///     .build();
///
/// let execution = job.run()?;
///
/// assert_eq!(execution.name, "import-companies");
/// assert_eq!(observed.get(), Some(BatchStatus::Completed));
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct JobBuilder<'a> {
    /// Optional name for the job (generated randomly if not specified)
    name: Option<String>,
    /// Collection of steps to be executed, in order
    steps: Vec<&'a dyn Step>,
    listeners: Vec<AfterJob<'a>>,
}

impl<'a> JobBuilder<'a> {
    pub fn new() -> Self {
        Self {
            name: None,
            steps: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn name(mut self, name: String) -> JobBuilder<'a> {
        self.name = Some(name);
        self
    }

    /// Sets the first step of the job.
    ///
    /// Semantically identical to `next()`, reads better for the initial step.
    pub fn start(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    pub fn next(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    /// Registers a callback run after the job, whether it completed or failed.
    pub fn after_job(mut self, listener: impl Fn(&JobExecution) + 'a) -> JobBuilder<'a> {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Builds the job. If no name has been provided, a random one is generated.
    pub fn build(self) -> JobInstance<'a> {
        JobInstance {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            steps: self.steps,
            listeners: self.listeners,
        }
    }
}
