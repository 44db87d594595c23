use crate::core::config::StorageConfig;
use crate::core::store::ObjectStore;
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tracing::debug;

/// S3 (or S3-compatible) bucket access via the AWS SDK.
pub struct S3Store {
    client: Client,
}

impl S3Store {
    /// Credentials and region come from the standard AWS provider chain
    /// unless the storage config overrides them.
    pub async fn from_config(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            debug!(%endpoint, "Using custom S3 endpoint");
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, container: &str, key: &str, body: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(container)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| anyhow!("{}", DisplayErrorContext(&e)))?;
        debug!("S3 PUT s3://{}/{}", container, key);
        Ok(())
    }

    async fn get_object(&self, container: &str, key: &str) -> Result<Option<Vec<u8>>> {
        match self
            .client
            .get_object()
            .bucket(container)
            .key(key)
            .send()
            .await
        {
            Ok(output) => {
                let data = output.body.collect().await?;
                Ok(Some(data.into_bytes().to_vec()))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    Ok(None)
                } else {
                    Err(anyhow!("{}", DisplayErrorContext(&service_err)))
                }
            }
        }
    }

    async fn create_container(&self, name: &str) -> Result<()> {
        bail!("S3 buckets are provisioned outside currency-etl, create {name} with your infrastructure tooling")
    }
}
