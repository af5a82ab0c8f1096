use aws_config::{Region, SdkConfig};

use crate::core::config::ClientConfig;

/// Connection settings shared by the SQS and S3 adapters.
#[derive(Debug, Clone, Default)]
pub struct AwsSettings {
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

impl From<&ClientConfig> for AwsSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            endpoint_url: config.endpoint_url.clone(),
            region: config.region.clone(),
        }
    }
}

impl AwsSettings {
    /// Loads the shared SDK config from the environment, applying any overrides.
    pub async fn load(&self) -> SdkConfig {
        let mut loader = aws_config::from_env();
        if let Some(endpoint) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        loader.load().await
    }

    #[must_use]
    pub fn is_local(&self) -> bool {
        self.endpoint_url.is_some()
    }
}
