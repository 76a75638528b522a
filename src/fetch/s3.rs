//! # S3 fetcher
//!
//! Streams an object out of S3 through the AWS SDK. The SDK is async, the
//! batch core is not: the fetcher owns a small tokio runtime and bridges the
//! object body to `std::io::Read` with [`SyncIoBridge`], so records are parsed
//! while the body is still downloading.
//!
//! ## Credentials
//!
//! An access key id and secret access key configured together are used as
//! static credentials. Without them the SDK default provider chain applies
//! (environment, shared profile, container or instance metadata).
//!
//! ## Example
//!
//! ```rust,no_run
//! use ch_import::config::S3Config;
//! use ch_import::fetch::{ObjectFetcher, s3::S3ObjectFetcher};
//!
//! # fn example() -> Result<(), ch_import::BatchError> {
//! let config = S3Config::new("companies-house", "BasicCompanyData.csv")
//!     .with_region("eu-west-1");
//!
//! let fetcher = S3ObjectFetcher::new(&config)?;
//! let stream = fetcher.fetch(&config.location())?;
//! # Ok(())
//! # }
//! ```

use std::{fmt, io::Read};

use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client,
    config::{Credentials, Region},
    error::DisplayErrorContext,
};
use log::{debug, info};
use tokio::runtime::{Builder, Runtime};
use tokio_util::io::SyncIoBridge;

use crate::{
    BatchError,
    config::{ObjectLocation, S3Config},
};

use super::ObjectFetcher;

/// Name reported by the static credentials provider.
const PROVIDER_NAME: &str = "ch-import";

/// Where the S3 client gets its credentials from.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialsSource {
    Static {
        access_key_id: String,
        secret_access_key: String,
    },
    /// Environment, profile or instance identity, resolved by the SDK.
    Ambient,
}

impl CredentialsSource {
    pub fn from_config(config: &S3Config) -> Result<Self, BatchError> {
        match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Ok(CredentialsSource::Static {
                access_key_id: access_key_id.clone(),
                secret_access_key: secret_access_key.clone(),
            }),
            (None, None) => Ok(CredentialsSource::Ambient),
            _ => Err(BatchError::Configuration(
                "access key id and secret access key must be configured together".to_string(),
            )),
        }
    }
}

impl fmt::Debug for CredentialsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialsSource::Static { access_key_id, .. } => f
                .debug_struct("Static")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"***")
                .finish(),
            CredentialsSource::Ambient => f.write_str("Ambient"),
        }
    }
}

/// Fetches objects from S3.
pub struct S3ObjectFetcher {
    client: Client,
    runtime: Runtime,
}

impl S3ObjectFetcher {
    /// Builds the S3 client for `config`.
    ///
    /// No request is sent here: credential and network failures surface on
    /// the first `fetch`.
    pub fn new(config: &S3Config) -> Result<Self, BatchError> {
        config.validate()?;

        // A single worker drives the SDK I/O while the batch thread blocks on
        // the bridged body.
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("s3-fetcher")
            .enable_all()
            .build()?;

        let client = runtime.block_on(build_client(config))?;

        Ok(Self { client, runtime })
    }
}

async fn build_client(config: &S3Config) -> Result<Client, BatchError> {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

    match CredentialsSource::from_config(config)? {
        CredentialsSource::Static {
            access_key_id,
            secret_access_key,
        } => {
            info!("Using configured credentials for S3 access");
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                PROVIDER_NAME,
            ));
        }
        CredentialsSource::Ambient => {
            info!("Using default credentials provider chain for S3 access");
        }
    }

    if let Some(endpoint) = &config.endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;

    // Custom endpoints (LocalStack, MinIO) expect path-style addressing.
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(config.endpoint.is_some())
        .build();

    Ok(Client::from_conf(s3_config))
}

impl ObjectFetcher for S3ObjectFetcher {
    fn fetch(&self, location: &ObjectLocation) -> Result<Box<dyn Read>, BatchError> {
        info!("Fetching {}", location);

        let output = self
            .runtime
            .block_on(
                self.client
                    .get_object()
                    .bucket(&location.bucket)
                    .key(&location.key)
                    .send(),
            )
            .map_err(|error| {
                BatchError::Fetch(format!("{}: {}", location, DisplayErrorContext(&error)))
            })?;

        debug!(
            "Streaming {} ({} bytes)",
            location,
            output.content_length().unwrap_or_default()
        );

        let body = Box::pin(output.body.into_async_read());

        Ok(Box::new(SyncIoBridge::new_with_handle(
            body,
            self.runtime.handle().clone(),
        )))
    }
}
