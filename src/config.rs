//! Job configuration.
//!
//! Built once at startup (see the `ch-import` binary) and passed down to the
//! components that need it.

use std::{fmt, path::PathBuf};

use crate::{BatchError, core::chunk::DEFAULT_CHUNK_SIZE};

/// Region the source bucket lives in unless configured otherwise.
pub const DEFAULT_REGION: &str = "eu-west-1";

/// Bucket and key of the source object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Configuration for S3 access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    pub bucket: String,
    pub key: String,
    pub region: String,
    /// Custom endpoint URL, for S3-compatible stores
    pub endpoint: Option<String>,
    /// Explicit access key id; the default provider chain is used when absent
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            key: String::new(),
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }
}

impl S3Config {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    pub fn location(&self) -> ObjectLocation {
        ObjectLocation::new(self.bucket.clone(), self.key.clone())
    }

    pub fn validate(&self) -> Result<(), BatchError> {
        if self.bucket.trim().is_empty() {
            return Err(BatchError::Configuration(
                "bucket name must not be empty".to_string(),
            ));
        }
        if self.key.trim().is_empty() {
            return Err(BatchError::Configuration(
                "object key must not be empty".to_string(),
            ));
        }
        if self.region.trim().is_empty() {
            return Err(BatchError::Configuration(
                "region must not be empty".to_string(),
            ));
        }
        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(BatchError::Configuration(
                "access key id and secret access key must be configured together".to_string(),
            ));
        }
        Ok(())
    }
}

/// Everything the import job needs.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub source: S3Config,
    /// JSON lines output file
    pub json_output: Option<PathBuf>,
    /// CSV output file
    pub csv_output: Option<PathBuf>,
    /// Append to existing output files instead of truncating them
    pub append: bool,
    pub chunk_size: usize,
    /// Number of malformed lines tolerated before the job fails
    pub skip_limit: usize,
}

impl JobConfig {
    pub fn new(source: S3Config) -> Self {
        Self {
            source,
            json_output: None,
            csv_output: None,
            append: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            skip_limit: 0,
        }
    }

    pub fn with_json_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.json_output = Some(path.into());
        self
    }

    pub fn with_csv_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.csv_output = Some(path.into());
        self
    }

    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_skip_limit(mut self, skip_limit: usize) -> Self {
        self.skip_limit = skip_limit;
        self
    }

    /// True when records go to standard output rather than files.
    pub fn is_console_output(&self) -> bool {
        self.json_output.is_none() && self.csv_output.is_none()
    }

    pub fn validate(&self) -> Result<(), BatchError> {
        self.source.validate()?;

        if self.chunk_size == 0 {
            return Err(BatchError::Configuration(
                "chunk size must be at least 1".to_string(),
            ));
        }

        if let (Some(json), Some(csv)) = (&self.json_output, &self.csv_output) {
            if json == csv {
                return Err(BatchError::Configuration(format!(
                    "JSON and CSV outputs must be different files: {}",
                    json.display()
                )));
            }
        }

        Ok(())
    }
}
