//! # Company import
//!
//! Wires the import job: the source object is fetched, its lines are read
//! as [`Company`] records in chunks, and every chunk is written to the JSON
//! lines file, the CSV file, or standard output when no file is configured.

use log::{debug, info};

use crate::{
    BatchError,
    company::{COMPANY_FIELDS, CSV_OUTPUT_FIELDS, Company},
    config::JobConfig,
    core::{
        item::ItemWriter,
        job::{BatchStatus, Job, JobBuilder, JobExecution},
        step::StepBuilder,
    },
    fetch::ObjectFetcher,
    item::{
        composite::CompositeItemWriter,
        console::ConsoleItemWriter,
        csv::{csv_reader::CsvItemReaderBuilder, csv_writer::CsvItemWriterBuilder},
        json::json_writer::JsonItemWriterBuilder,
    },
};

pub const JOB_NAME: &str = "import-companies";

pub const STEP_NAME: &str = "import-companies-step";

/// Positions of the company name and number on each source line.
pub const COMPANY_FIELD_INDEXES: [usize; 2] = [0, 1];

/// Runs the import described by `config`, reading the source through
/// `fetcher`.
///
/// `notify` is called once the job completed; a failed job does not call it.
///
/// # Returns
/// - `Ok(JobExecution)` with status `Completed`
/// - `Err(BatchError::Configuration)` or `Err(BatchError::Io)` when the job
///   could not be set up, `Err(BatchError::Fetch)` when the source could not
///   be fetched; nothing was read in either case
/// - `Err(BatchError::Step)` when the job ran and failed
pub fn run_import<N>(
    config: &JobConfig,
    fetcher: &dyn ObjectFetcher,
    notify: N,
) -> Result<JobExecution, BatchError>
where
    N: Fn(&JobExecution),
{
    config.validate()?;

    let stream = fetcher.fetch(&config.source.location())?;

    let reader = CsvItemReaderBuilder::new()
        .delimiter(b',')
        .included_fields(&COMPANY_FIELD_INDEXES)
        .names(&COMPANY_FIELDS)
        .from_reader(stream);

    let json_writer = config
        .json_output
        .as_ref()
        .map(|path| {
            JsonItemWriterBuilder::new()
                .append(config.append)
                .from_path(path)
        })
        .transpose()?;

    let csv_writer = config
        .csv_output
        .as_ref()
        .map(|path| {
            CsvItemWriterBuilder::new()
                .field_names(&CSV_OUTPUT_FIELDS)
                .append(config.append)
                .from_path(path)
        })
        .transpose()?;

    let console_writer = ConsoleItemWriter::new();

    let mut delegates: Vec<&dyn ItemWriter<Company>> = Vec::new();
    if let Some(writer) = &json_writer {
        delegates.push(writer);
    }
    if let Some(writer) = &csv_writer {
        delegates.push(writer);
    }
    if config.is_console_output() {
        info!("No output file configured, printing companies to standard output");
        delegates.push(&console_writer);
    }

    let writer = CompositeItemWriter::new(delegates);
    debug!("Writing companies to {} output(s)", writer.len());

    let step = StepBuilder::new(STEP_NAME)
        .chunk::<Company>(config.chunk_size)
        .reader(&reader)
        .writer(&writer)
        .skip_limit(config.skip_limit)
        .build()?;

    let job = JobBuilder::new()
        .name(JOB_NAME.to_string())
        .start(&step)
        .after_job(|execution| {
            if execution.status == BatchStatus::Completed {
                info!("Job {} finished, sending completion notification", execution.name);
                notify(execution);
            }
        })
        .build();

    job.run()
}
