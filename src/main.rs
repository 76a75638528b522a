//! ch-import: imports the company register extract stored on S3 into JSON
//! lines and CSV files.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use ch_import::{
    config::{DEFAULT_REGION, JobConfig, S3Config},
    core::chunk::DEFAULT_CHUNK_SIZE,
    fetch::s3::S3ObjectFetcher,
    import::run_import,
};

/// Company register import from S3.
#[derive(Parser, Debug)]
#[command(name = "ch-import")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bucket holding the source file.
    #[arg(long, env = "S3_BUCKET_NAME")]
    bucket: String,

    /// Key of the source file.
    #[arg(long, env = "S3_KEY_NAME")]
    key: String,

    /// Region of the bucket.
    #[arg(long, env = "S3_REGION", default_value = DEFAULT_REGION)]
    region: String,

    /// Custom S3 endpoint, for S3-compatible stores.
    #[arg(long, env = "S3_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Access key id; the default credentials chain is used when absent.
    #[arg(long, env = "AWS_ACCESS_KEY_ID", requires = "aws_secret_key")]
    aws_access_key_id: Option<String>,

    /// Secret access key.
    #[arg(
        long,
        env = "AWS_SECRET_ACCESS_KEY",
        hide_env_values = true,
        requires = "aws_access_key_id"
    )]
    aws_secret_key: Option<String>,

    /// JSON lines output file.
    #[arg(long, env = "JSON_OUTPUT_FILE_PATH")]
    json_output: Option<PathBuf>,

    /// CSV output file.
    #[arg(long, env = "CSV_OUTPUT_FILE_PATH")]
    csv_output: Option<PathBuf>,

    /// Append to the output files instead of truncating them.
    #[arg(long, env = "OUTPUT_APPEND")]
    append: bool,

    /// Number of records written per chunk.
    #[arg(long, env = "CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Number of malformed lines tolerated before the job fails.
    #[arg(long, env = "SKIP_LIMIT", default_value_t = 0)]
    skip_limit: usize,
}

impl Args {
    fn into_config(self) -> JobConfig {
        let mut source = S3Config::new(self.bucket, self.key).with_region(self.region);

        if let Some(endpoint) = self.endpoint_url {
            source = source.with_endpoint(endpoint);
        }
        source.access_key_id = self.aws_access_key_id;
        source.secret_access_key = self.aws_secret_key;

        let mut config = JobConfig::new(source)
            .with_append(self.append)
            .with_chunk_size(self.chunk_size)
            .with_skip_limit(self.skip_limit);
        config.json_output = self.json_output;
        config.csv_output = self.csv_output;

        config
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config();
    config.validate().context("invalid configuration")?;

    let fetcher = S3ObjectFetcher::new(&config.source).context("cannot create S3 client")?;

    let execution = run_import(&config, &fetcher, |execution| {
        info!(
            "Import {} ({}) completed in {:?}",
            execution.name, execution.id, execution.duration
        );
    })
    .with_context(|| format!("import of {} failed", config.source.location()))?;

    for step in &execution.step_executions {
        info!(
            "Step {}: {} read, {} written, {} skipped, {} commits",
            step.name, step.read_count, step.write_count, step.read_error_count, step.commit_count
        );
    }

    Ok(())
}
