//! npm Registry client
//!
//! Fetches package metadata from the npm registry.
//! API endpoint: {registry}/{package}, scoped names as `@scope%2Fname`

use crate::error::RegistryError;
use crate::registry::{HttpClient, Packument, PublishedVersion, Registry, RequestContext};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// npm registry base URL
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Abbreviated metadata media type; omits publish times and readmes
const ABBREVIATED_ACCEPT: &str = "application/vnd.npm.install-v1+json";

const FULL_ACCEPT: &str = "application/json";

/// npm Registry client
pub struct NpmRegistry {
    client: HttpClient,
    base_url: String,
}

/// npm package document
#[derive(Debug, Deserialize)]
struct NpmDocument {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "dist-tags")]
    dist_tags: HashMap<String, String>,
    #[serde(default)]
    versions: HashMap<String, NpmVersion>,
    /// Version → ISO timestamp; also holds `created`, `modified` and `unpublished`
    #[serde(default)]
    time: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct NpmVersion {
    #[serde(default)]
    dependencies: Option<HashMap<String, Value>>,
}

impl NpmRegistry {
    /// Create a client for the public npm registry
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, DEFAULT_REGISTRY_URL)
    }

    /// Create a client for a custom registry
    pub fn with_base_url(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the URL for a package
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}", self.base_url, encode_package_name(package))
    }

    async fn fetch(&self, package: &str, accept: &str) -> Result<NpmDocument, RegistryError> {
        let url = self.build_url(package);
        let ctx = RequestContext {
            package,
            registry: self.registry_name(),
        };
        tracing::debug!(package, %url, "fetching package document");
        self.client.get_json(&url, Some(accept), ctx).await
    }
}

/// Encode a package name for use as a URL path segment
pub fn encode_package_name(package: &str) -> String {
    if package.starts_with('@') {
        package.replacen('/', "%2F", 1)
    } else {
        package.to_string()
    }
}

fn parse_time(value: &Value) -> Option<DateTime<Utc>> {
    value.as_str()?.parse::<DateTime<Utc>>().ok()
}

#[async_trait]
impl Registry for NpmRegistry {
    fn registry_name(&self) -> &str {
        "npm"
    }

    async fn latest_version(&self, package: &str) -> Result<String, RegistryError> {
        let document = self.fetch(package, ABBREVIATED_ACCEPT).await?;
        document
            .dist_tags
            .get("latest")
            .cloned()
            .ok_or_else(|| RegistryError::package_not_found(package, self.registry_name()))
    }

    async fn packument(&self, package: &str) -> Result<Packument, RegistryError> {
        let document = self.fetch(package, FULL_ACCEPT).await?;

        let versions = document
            .versions
            .into_iter()
            .map(|(version, meta)| {
                let dependencies: BTreeMap<String, String> = meta
                    .dependencies
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|(name, range)| range.as_str().map(|r| (name, r.to_string())))
                    .collect();
                let published_at = document.time.get(&version).and_then(parse_time);
                (
                    version,
                    PublishedVersion {
                        dependencies,
                        published_at,
                    },
                )
            })
            .collect();

        Ok(Packument {
            name: if document.name.is_empty() {
                package.to_string()
            } else {
                document.name
            },
            latest: document.dist_tags.get("latest").cloned(),
            versions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn registry(url: &str) -> NpmRegistry {
        let client = HttpClient::new()
            .unwrap()
            .with_base_delay(Duration::from_millis(1));
        NpmRegistry::with_base_url(client, url)
    }

    #[test]
    fn test_npm_registry_name() {
        let client = HttpClient::new().unwrap();
        let registry = NpmRegistry::new(client);
        assert_eq!(registry.registry_name(), "npm");
        assert_eq!(registry.base_url(), DEFAULT_REGISTRY_URL);
    }

    #[test]
    fn test_build_url() {
        let registry = registry("https://registry.npmjs.org/");
        assert_eq!(
            registry.build_url("lodash"),
            "https://registry.npmjs.org/lodash"
        );
    }

    #[test]
    fn test_build_url_scoped_package() {
        let registry = registry("https://npm.example.com/");
        assert_eq!(
            registry.build_url("@types/node"),
            "https://npm.example.com/@types%2Fnode"
        );
    }

    #[tokio::test]
    async fn test_latest_version() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/lodash")
            .match_header("accept", ABBREVIATED_ACCEPT)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name":"lodash","dist-tags":{"latest":"4.17.21","next":"5.0.0-beta"},"versions":{}}"#)
            .create_async()
            .await;

        let latest = registry(&server.url()).latest_version("lodash").await.unwrap();
        assert_eq!(latest, "4.17.21");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_latest_version_scoped() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/@types%2Fnode")
            .with_status(200)
            .with_body(r#"{"dist-tags":{"latest":"20.11.0"}}"#)
            .create_async()
            .await;

        let latest = registry(&server.url())
            .latest_version("@types/node")
            .await
            .unwrap();
        assert_eq!(latest, "20.11.0");
    }

    #[tokio::test]
    async fn test_latest_version_without_tag_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/empty")
            .with_status(200)
            .with_body(r#"{"name":"empty","dist-tags":{}}"#)
            .create_async()
            .await;

        let err = registry(&server.url())
            .latest_version("empty")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_latest_version_404() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/does-not-exist")
            .with_status(404)
            .with_body(r#"{"error":"Not found"}"#)
            .create_async()
            .await;

        let err = registry(&server.url())
            .latest_version("does-not-exist")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_packument() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/left-pad")
            .match_header("accept", FULL_ACCEPT)
            .with_status(200)
            .with_body(
                r#"{
                  "name": "left-pad",
                  "dist-tags": {"latest": "1.3.0"},
                  "versions": {
                    "1.2.0": {},
                    "1.3.0": {"dependencies": {"a": "^1.0.0", "weird": {"x": 1}}}
                  },
                  "time": {
                    "created": "2016-03-01T00:00:00.000Z",
                    "1.2.0": "2017-11-01T10:00:00.000Z",
                    "1.3.0": "2018-04-09T01:30:00.000Z",
                    "unpublished": {"time": "2019-01-01T00:00:00.000Z"}
                  }
                }"#,
            )
            .create_async()
            .await;

        let packument = registry(&server.url()).packument("left-pad").await.unwrap();
        assert_eq!(packument.name, "left-pad");
        assert_eq!(packument.latest.as_deref(), Some("1.3.0"));
        assert_eq!(packument.versions.len(), 2);

        let v13 = packument.version("1.3.0").unwrap();
        assert_eq!(v13.dependencies.len(), 1);
        assert_eq!(v13.dependencies.get("a").map(String::as_str), Some("^1.0.0"));
        assert_eq!(
            packument.published_at("1.3.0").unwrap().to_rfc3339(),
            "2018-04-09T01:30:00+00:00"
        );
        assert!(packument.version("1.2.0").unwrap().dependencies.is_empty());
    }
}
