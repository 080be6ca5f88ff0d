use crate::purge::{PurgeError, PurgeReport, PurgeTarget, purge};
use crate::s3::S3Store;
use std::fmt::{Debug, Formatter};
use thiserror::Error;
use url::Url;

pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Bucket name is required")]
    MissingBucket,
    #[error("You must specify AWS credentials")]
    MissingCredentials,
}

/// Static access key pair supplied for a single run. No session token, no refresh.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StaticCredentials {
    access_key_id: String,
    secret_access_key: String,
}

impl StaticCredentials {
    pub fn new<S: Into<String>>(
        access_key_id: S,
        secret_access_key: S,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }
}

impl Debug for StaticCredentials {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .finish()
    }
}

/// Everything a run needs, passed explicitly instead of read from parsed flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeConfig {
    pub target: PurgeTarget,
    pub credentials: StaticCredentials,
    pub region: String,
    pub endpoint_url: Option<Url>,
}

impl PurgeConfig {
    /// Empty values count as missing. The bucket is checked before the credentials.
    pub fn try_new(
        bucket: Option<String>,
        prefix: Option<String>,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let present = |value: Option<String>| value.filter(|value| !value.is_empty());

        let Some(bucket) = present(bucket) else {
            return Err(ConfigError::MissingBucket);
        };

        let (Some(access_key_id), Some(secret_access_key)) =
            (present(access_key_id), present(secret_access_key))
        else {
            return Err(ConfigError::MissingCredentials);
        };

        Ok(Self {
            target: PurgeTarget::new(bucket, prefix),
            credentials: StaticCredentials::new(access_key_id, secret_access_key),
            region: DEFAULT_REGION.to_owned(),
            endpoint_url: None,
        })
    }

    pub fn with_region<S: Into<String>>(
        mut self,
        region: S,
    ) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_endpoint_url(
        mut self,
        endpoint_url: Option<Url>,
    ) -> Self {
        self.endpoint_url = endpoint_url;
        self
    }
}

/// Connects to S3 with the configured credentials and purges the configured target.
pub async fn purge_with_config(config: &PurgeConfig) -> Result<PurgeReport, PurgeError> {
    let store = S3Store::connect(config).await;

    purge(&store, &config.target).await
}
