use crate::config::PurgeConfig;
use crate::store::{ListingPage, ObjectStore, ObjectVersionRef, PageCursor, StoreError};
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::operation::delete_objects::DeleteObjectsOutput;
use aws_sdk_s3::operation::list_object_versions::ListObjectVersionsOutput;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_smithy_types::error::display::DisplayErrorContext;
use tracing::warn;

/// Version id S3 reports for objects written while versioning was off.
const NULL_VERSION: &str = "null";

/// Shown as the credential source in SDK debug output.
const PROVIDER_NAME: &str = "s3-purge";

impl StoreError {
    /// Keeps the whole SDK error chain, which is where S3 puts the useful part.
    pub fn from_sdk<E: std::error::Error>(err: &E) -> Self {
        Self::new(DisplayErrorContext(err).to_string())
    }
}

#[derive(Debug, Clone)]
pub struct S3Store {
    client: S3Client,
}

impl S3Store {
    pub const fn from_client(client: S3Client) -> Self {
        Self { client }
    }

    /// Builds a client that only ever uses the credentials in `config`.
    pub async fn connect(config: &PurgeConfig) -> Self {
        let credentials = Credentials::new(
            config.credentials.access_key_id(),
            config.credentials.secret_access_key(),
            None,
            None,
            PROVIDER_NAME,
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);

        if let Some(url) = &config.endpoint_url {
            loader = loader.endpoint_url(url.as_str());
        }

        let shared_config = loader.load().await;

        // S3-compatible stores (R2, MinIO) generally want path-style addressing
        let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        Self::from_client(S3Client::from_conf(s3_config))
    }
}

fn listing_page(output: &ListObjectVersionsOutput) -> ListingPage {
    let versions = output
        .versions()
        .iter()
        .filter_map(|version| version_ref(version.key(), version.version_id()))
        .collect();

    let delete_markers = output
        .delete_markers()
        .iter()
        .filter_map(|marker| version_ref(marker.key(), marker.version_id()))
        .collect();

    ListingPage {
        versions,
        delete_markers,
        is_truncated: output.is_truncated().unwrap_or(false),
        next_key_marker: output.next_key_marker().map(str::to_owned),
        next_version_id_marker: output.next_version_id_marker().map(str::to_owned),
    }
}

fn version_ref(
    key: Option<&str>,
    version_id: Option<&str>,
) -> Option<ObjectVersionRef> {
    let key = key?;

    Some(ObjectVersionRef::new(
        key,
        version_id.unwrap_or(NULL_VERSION),
    ))
}

fn delete_request(objects: &[ObjectVersionRef]) -> Result<Delete, StoreError> {
    let identifiers = objects
        .iter()
        .map(|object| {
            ObjectIdentifier::builder()
                .key(&object.key)
                .version_id(&object.version_id)
                .build()
                .map_err(|err| StoreError::from_sdk(&err))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Delete::builder()
        .set_objects(Some(identifiers))
        .quiet(true)
        .build()
        .map_err(|err| StoreError::from_sdk(&err))
}

/// Quiet mode still reports the entries S3 refused to delete.
fn check_delete_output(output: &DeleteObjectsOutput) -> Result<(), StoreError> {
    let errors = output.errors();
    if errors.is_empty() {
        return Ok(());
    }

    for error in errors {
        warn!(
            key = error.key().unwrap_or_default(),
            version_id = error.version_id().unwrap_or_default(),
            code = error.code().unwrap_or_default(),
            "could not delete object version: {}",
            error.message().unwrap_or_default()
        );
    }

    let first = &errors[0];
    Err(StoreError::new(format!(
        "{} of the batch could not be deleted, first failure: {} ({}): {}",
        errors.len(),
        first.key().unwrap_or_default(),
        first.code().unwrap_or("unknown error"),
        first.message().unwrap_or_default(),
    )))
}

impl ObjectStore for S3Store {
    async fn list_versions(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        cursor: Option<&PageCursor>,
        max_keys: i32,
    ) -> Result<ListingPage, StoreError> {
        let output = self
            .client
            .list_object_versions()
            .bucket(bucket)
            .set_prefix(prefix.map(str::to_owned))
            .set_key_marker(cursor.map(|cursor| cursor.key_marker.clone()))
            .set_version_id_marker(cursor.and_then(|cursor| cursor.version_id_marker.clone()))
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|err| StoreError::from_sdk(&err))?;

        Ok(listing_page(&output))
    }

    async fn delete_versions(
        &self,
        bucket: &str,
        objects: &[ObjectVersionRef],
    ) -> Result<(), StoreError> {
        let delete = delete_request(objects)?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|err| StoreError::from_sdk(&err))?;

        check_delete_output(&output)
    }
}
