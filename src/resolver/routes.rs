//! Connector routes

use crate::config::ConnectionConfig;
use crate::metadata::UrlEncoding;

/// `api-version` sent with table schema requests
pub const SCHEMA_API_VERSION: &str = "2015-09-01";

/// Builds request paths for one connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    prefix: String,
    version: String,
    encoding: UrlEncoding,
}

impl Routes {
    pub fn new(config: &ConnectionConfig, encoding: UrlEncoding) -> Self {
        let version = config
            .api_version
            .as_deref()
            .map(|v| v.trim_matches('/'))
            .filter(|v| !v.is_empty())
            .map(|v| format!("/{v}"))
            .unwrap_or_default();

        Self {
            prefix: prefix_of(config),
            version,
            encoding,
        }
    }

    /// `GET {prefix}/$metadata.json/datasets`
    pub fn dataset_metadata(config: &ConnectionConfig) -> String {
        format!("{}/$metadata.json/datasets", prefix_of(config))
    }

    /// `GET` table listing
    pub fn tables(&self, dataset: &str) -> String {
        format!("{}/tables", self.dataset(dataset))
    }

    /// `GET` table schema; also the metadata cache key for the table
    pub fn table_schema(&self, dataset: &str, table: &str) -> String {
        format!(
            "{}{}/$metadata.json/datasets/{}/tables/{}?api-version={SCHEMA_API_VERSION}",
            self.prefix,
            self.version,
            self.encoding.encode(dataset),
            self.encoding.encode(table)
        )
    }

    /// `POST` native SQL query
    pub fn sql_query(&self, dataset: &str) -> String {
        format!("{}/query/sql", self.dataset(dataset))
    }

    /// `GET` table rows; `query` is appended after `?` when non-empty
    pub fn items(&self, dataset: &str, table: &str, query: &str) -> String {
        let path = format!(
            "{}/tables/{}/items",
            self.dataset(dataset),
            self.encoding.encode(table)
        );
        if query.is_empty() {
            path
        } else {
            format!("{path}?{query}")
        }
    }

    fn dataset(&self, dataset: &str) -> String {
        format!(
            "{}{}/datasets/{}",
            self.prefix,
            self.version,
            self.encoding.encode(dataset)
        )
    }
}

fn prefix_of(config: &ConnectionConfig) -> String {
    config.uri_prefix.trim_end_matches('/').to_string()
}
