//! Import from S3 through the real fetcher.
//!
//! The LocalStack tests are marked `#[ignore]`. To run them:
//!
//! ```bash
//! docker run -d -p 4566:4566 localstack/localstack
//! LOCALSTACK_ENDPOINT=http://localhost:4566 cargo test --test s3_integration -- --ignored
//! ```
#![cfg(feature = "s3")]

mod common;

use std::{env, error::Error, fs};

use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client,
    config::{Credentials, Region},
    primitives::ByteStream,
};
use rand::distr::{Alphanumeric, SampleString};
use tokio::runtime::{Builder, Runtime};

use ch_import::{
    BatchError,
    config::{JobConfig, S3Config},
    core::job::BatchStatus,
    fetch::{ObjectFetcher, s3::S3ObjectFetcher},
    import::run_import,
};

use common::temp_file;

const REGION: &str = "us-east-1";

const ACCESS_KEY_ID: &str = "test";

const SECRET_ACCESS_KEY: &str = "test";

/// Client used to seed LocalStack before a run.
struct LocalStack {
    runtime: Runtime,
    client: Client,
    endpoint: String,
}

impl LocalStack {
    fn new() -> Result<Self, Box<dyn Error>> {
        let endpoint = env::var("LOCALSTACK_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:4566".to_string());

        let runtime = Builder::new_current_thread().enable_all().build()?;

        let sdk_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(REGION))
                .endpoint_url(&endpoint)
                .credentials_provider(Credentials::new(
                    ACCESS_KEY_ID,
                    SECRET_ACCESS_KEY,
                    None,
                    None,
                    "localstack",
                ))
                .load(),
        );

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Ok(Self {
            runtime,
            client: Client::from_conf(s3_config),
            endpoint,
        })
    }

    /// Creates a fresh bucket and uploads `data` under `key`.
    fn upload(&self, key: &str, data: &str) -> Result<String, Box<dyn Error>> {
        let bucket = format!(
            "companies-{}",
            Alphanumeric
                .sample_string(&mut rand::rng(), 12)
                .to_lowercase()
        );

        self.runtime.block_on(async {
            self.client.create_bucket().bucket(&bucket).send().await?;
            self.client
                .put_object()
                .bucket(&bucket)
                .key(key)
                .body(ByteStream::from(data.as_bytes().to_vec()))
                .content_type("text/csv")
                .send()
                .await?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(bucket)
    }

    fn source(&self, bucket: &str, key: &str) -> S3Config {
        S3Config::new(bucket, key)
            .with_region(REGION)
            .with_endpoint(self.endpoint.clone())
            .with_credentials(ACCESS_KEY_ID, SECRET_ACCESS_KEY)
    }
}

#[test]
#[ignore = "requires LocalStack"]
fn object_on_s3_should_be_imported() -> Result<(), Box<dyn Error>> {
    let localstack = LocalStack::new()?;
    let bucket = localstack.upload("BasicCompanyData.csv", "Acme Ltd,001\nBeta Corp,002\n")?;

    let config = JobConfig::new(localstack.source(&bucket, "BasicCompanyData.csv"))
        .with_json_output(temp_file("json"))
        .with_csv_output(temp_file("csv"));
    let fetcher = S3ObjectFetcher::new(&config.source)?;

    let execution = run_import(&config, &fetcher, |_| {})?;

    assert_eq!(execution.status, BatchStatus::Completed);

    let json = fs::read_to_string(config.json_output.as_ref().ok_or("no JSON output")?)?;
    let csv = fs::read_to_string(config.csv_output.as_ref().ok_or("no CSV output")?)?;
    assert_eq!(
        json,
        "{\"companyName\":\"Acme Ltd\",\"companyNumber\":\"001\"}\n\
         {\"companyName\":\"Beta Corp\",\"companyNumber\":\"002\"}\n"
    );
    assert_eq!(csv, "001,Acme Ltd\n002,Beta Corp\n");

    Ok(())
}

#[test]
#[ignore = "requires LocalStack"]
fn missing_key_on_s3_should_be_a_fetch_error() -> Result<(), Box<dyn Error>> {
    let localstack = LocalStack::new()?;
    let bucket = localstack.upload("BasicCompanyData.csv", "Acme Ltd,001\n")?;

    let source = localstack.source(&bucket, "missing.csv");
    let fetcher = S3ObjectFetcher::new(&source)?;

    let result = run_import(&JobConfig::new(source.clone()), &fetcher, |_| {});

    match result {
        Err(BatchError::Fetch(message)) => {
            assert!(message.starts_with(&source.location().to_string()));
        }
        other => panic!("expected a fetch error, got {:?}", other.map(|e| e.status)),
    }

    Ok(())
}

#[test]
fn unreachable_endpoint_should_be_a_fetch_error() -> Result<(), BatchError> {
    let source = S3Config::new("companies-house", "BasicCompanyData.csv")
        .with_endpoint("http://127.0.0.1:1")
        .with_credentials(ACCESS_KEY_ID, SECRET_ACCESS_KEY);
    let fetcher = S3ObjectFetcher::new(&source)?;

    let result = fetcher.fetch(&source.location());

    assert!(matches!(result, Err(BatchError::Fetch(_))));

    Ok(())
}
