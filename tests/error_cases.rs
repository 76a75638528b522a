mod common;

use std::{
    cell::Cell,
    error::Error,
    io::{self, ErrorKind},
};

use ch_import::{
    BatchError,
    company::{COMPANY_FIELDS, CSV_OUTPUT_FIELDS, Company},
    config::{JobConfig, S3Config},
    core::{
        job::{Job, JobBuilder},
        step::{Step, StepBuilder, StepExecution, StepStatus},
    },
    import::{COMPANY_FIELD_INDEXES, run_import},
    item::{
        composite::CompositeItemWriterBuilder,
        csv::{csv_reader::CsvItemReaderBuilder, csv_writer::CsvItemWriterBuilder},
        json::json_writer::JsonItemWriterBuilder,
    },
};

use common::{MissingObjectFetcher, MockSink, StaticFetcher, temp_file};

#[test]
fn missing_object_should_fail_before_outputs_are_opened() {
    let json_path = temp_file("json");
    let csv_path = temp_file("csv");
    let config = JobConfig::new(S3Config::new("companies-house", "missing.csv"))
        .with_json_output(&json_path)
        .with_csv_output(&csv_path);
    let notified = Cell::new(false);

    let result = run_import(&config, &MissingObjectFetcher, |_| notified.set(true));

    match result {
        Err(BatchError::Fetch(message)) => {
            assert!(message.starts_with("s3://companies-house/missing.csv"));
        }
        other => panic!("expected a fetch error, got {:?}", other.map(|e| e.status)),
    }
    assert!(!notified.get());
    assert!(!json_path.exists());
    assert!(!csv_path.exists());
}

#[test]
fn unwritable_output_should_fail_before_the_job_starts() {
    let missing_dir = temp_file("d");
    let config = JobConfig::new(S3Config::new("companies-house", "companies.csv"))
        .with_json_output(missing_dir.join("companies.json"));
    let notified = Cell::new(false);

    let result = run_import(
        &config,
        &StaticFetcher::new("Acme Ltd,001\n"),
        |_| notified.set(true),
    );

    assert!(matches!(result, Err(BatchError::Io(_))));
    assert!(!notified.get());
}

#[test]
fn same_output_for_json_and_csv_should_be_rejected() {
    let path = temp_file("out");
    let config = JobConfig::new(S3Config::new("companies-house", "companies.csv"))
        .with_json_output(&path)
        .with_csv_output(&path);
    let fetcher = StaticFetcher::new("Acme Ltd,001\n");

    let result = run_import(&config, &fetcher, |_| {});

    assert!(matches!(result, Err(BatchError::Configuration(_))));
    assert_eq!(fetcher.fetch_count(), 0);
}

#[test]
fn failing_writer_should_fail_the_step() -> Result<(), Box<dyn Error>> {
    let reader = CsvItemReaderBuilder::new()
        .included_fields(&COMPANY_FIELD_INDEXES)
        .names(&COMPANY_FIELDS)
        .from_reader("Acme Ltd,001\nBeta Corp,002\n".as_bytes());

    let json_writer = JsonItemWriterBuilder::new().from_writer(Vec::new());

    let mut sink = MockSink::default();
    sink.expect_write()
        .returning(|_buf| Err(io::Error::from(ErrorKind::PermissionDenied)));
    sink.expect_flush().returning(|| Ok(()));
    let csv_writer = CsvItemWriterBuilder::new()
        .field_names(&CSV_OUTPUT_FIELDS)
        .from_writer(sink);

    let writer = CompositeItemWriterBuilder::<Company>::new()
        .delegate(&json_writer)
        .delegate(&csv_writer)
        .build();

    let step = StepBuilder::new("failing-writer")
        .chunk::<Company>(100)
        .reader(&reader)
        .writer(&writer)
        .build()?;

    let mut execution = StepExecution::new(step.get_name());
    let result = step.execute(&mut execution);

    assert!(matches!(result, Err(BatchError::ItemWriter(_))));
    assert_eq!(execution.status, StepStatus::WriteError);
    assert_eq!(execution.read_count, 2);
    assert_eq!(execution.write_count, 0);
    assert_eq!(execution.write_error_count, 2);
    assert_eq!(execution.commit_count, 0);

    Ok(())
}

#[test]
fn failing_writer_should_fail_the_job_and_skip_later_steps() -> Result<(), Box<dyn Error>> {
    let reader = CsvItemReaderBuilder::new()
        .included_fields(&COMPANY_FIELD_INDEXES)
        .names(&COMPANY_FIELDS)
        .from_reader("Acme Ltd,001\n".as_bytes());

    let mut sink = MockSink::default();
    sink.expect_write()
        .returning(|_buf| Err(io::Error::from(ErrorKind::StorageFull)));
    sink.expect_flush().returning(|| Ok(()));
    let writer = CsvItemWriterBuilder::new()
        .field_names(&CSV_OUTPUT_FIELDS)
        .from_writer(sink);

    let failing = StepBuilder::new("failing")
        .chunk::<Company>(10)
        .reader(&reader)
        .writer(&writer)
        .build()?;

    let other_reader = CsvItemReaderBuilder::new()
        .included_fields(&COMPANY_FIELD_INDEXES)
        .names(&COMPANY_FIELDS)
        .from_reader("Beta Corp,002\n".as_bytes());
    let other_writer = JsonItemWriterBuilder::new().from_writer(Vec::new());

    let never_run = StepBuilder::new("never-run")
        .chunk::<Company>(10)
        .reader(&other_reader)
        .writer(&other_writer)
        .build()?;

    let listener_calls = Cell::new(0);
    let job = JobBuilder::new()
        .start(&failing)
        .next(&never_run)
        .after_job(|_| listener_calls.set(listener_calls.get() + 1))
        .build();

    let result = job.run();

    assert!(matches!(result, Err(BatchError::Step(ref name)) if name == "failing"));
    assert_eq!(listener_calls.get(), 1);

    Ok(())
}
