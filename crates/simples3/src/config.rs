use serde::{Deserialize, Serialize};

use crate::keys::apply_prefix;

/// Region used when none is given.
pub const DEFAULT_REGION: &str = "us-east-1";

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

/// Bucket, region and optional key prefix of an [`S3`](crate::S3) client.
///
/// Fixed for the lifetime of the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Base prefix prepended (with a `/`) to every key. `None` and `""`
    /// both mean keys are used as given.
    #[serde(default)]
    pub prefix: Option<String>,
}

impl ClientConfig {
    /// Config for `bucket` in the default region, without a prefix.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: default_region(),
            prefix: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// The configured prefix, if it is non-empty.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref().filter(|p| !p.is_empty())
    }

    /// Key used against the store for the logical `key`.
    pub fn effective_key(&self, key: &str) -> String {
        apply_prefix(self.prefix(), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ClientConfig::new("bucket");
        assert_eq!(c.bucket, "bucket");
        assert_eq!(c.region, "us-east-1");
        assert!(c.prefix().is_none());
        assert_eq!(c.effective_key("k"), "k");
    }

    #[test]
    fn builder() {
        let c = ClientConfig::new("bucket")
            .with_region("eu-west-1")
            .with_prefix("test");
        assert_eq!(c.region, "eu-west-1");
        assert_eq!(c.prefix(), Some("test"));
        assert_eq!(c.effective_key("k"), "test/k");
    }

    #[test]
    fn empty_prefix_is_no_prefix() {
        let c = ClientConfig::new("bucket").with_prefix("");
        assert!(c.prefix().is_none());
        assert_eq!(c.effective_key("k"), "k");
    }

    #[test]
    fn deserialize_fills_defaults() {
        let c: ClientConfig = serde_json::from_str(r#"{"bucket": "b"}"#).unwrap();
        assert_eq!(c, ClientConfig::new("b"));

        let c: ClientConfig =
            serde_json::from_str(r#"{"bucket": "b", "region": "ap-northeast-1", "prefix": "p"}"#)
                .unwrap();
        assert_eq!(c.region, "ap-northeast-1");
        assert_eq!(c.effective_key("x"), "p/x");
    }
}
