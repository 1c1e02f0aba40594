//! Dataset metadata (`$metadata.json/datasets`)

use crate::error::Result;
use crate::types::{JsonValue, OptionStringExt};
use serde::{Deserialize, Serialize};

/// How dataset and table names are encoded into route segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlEncoding {
    /// Percent-encode once
    #[default]
    Single,
    /// Percent-encode twice
    Double,
}

impl UrlEncoding {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.eq_ignore_ascii_case("double") => UrlEncoding::Double,
            _ => UrlEncoding::Single,
        }
    }

    /// Encode one route segment
    pub fn encode(self, segment: &str) -> String {
        let once = urlencoding::encode(segment).into_owned();
        match self {
            UrlEncoding::Single => once,
            UrlEncoding::Double => urlencoding::encode(&once).into_owned(),
        }
    }
}

/// Where the table enumeration of a dataset comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableSource {
    /// A single fixed dataset
    Singleton,
    /// Most-recently-used list
    Mru,
    Other(String),
}

impl TableSource {
    fn parse(raw: Option<String>) -> Option<Self> {
        let raw = raw.none_if_empty()?;
        Some(match raw.to_ascii_lowercase().as_str() {
            "singleton" => TableSource::Singleton,
            "mru" => TableSource::Mru,
            _ => TableSource::Other(raw),
        })
    }
}

/// `tabular` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularMetadata {
    pub source: Option<TableSource>,
    pub display_name: Option<String>,
    pub url_encoding: UrlEncoding,
    pub table_display_name: Option<String>,
    pub table_plural_name: Option<String>,
}

/// `blob` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMetadata {
    pub source: Option<TableSource>,
    pub display_name: Option<String>,
    pub url_encoding: UrlEncoding,
}

/// Dataset kind, decided once at parse time
///
/// A document carrying a `tabular` block is tabular even if it also has a
/// `blob` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetKind {
    Tabular(TabularMetadata),
    Blob(BlobMetadata),
    Unknown,
}

/// `x-ms-dynamic-values` on a parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicValues {
    pub path: String,
    #[serde(rename = "value-collection", default)]
    pub value_collection: Option<String>,
    #[serde(rename = "value-path", default)]
    pub value_path: Option<String>,
    #[serde(rename = "value-title", default)]
    pub value_title: Option<String>,
}

/// One parameter needed to address the dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataParameter {
    pub name: String,
    #[serde(rename = "type", default)]
    pub parameter_type: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "urlEncoding", default)]
    pub url_encoding: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "x-ms-summary", default)]
    pub summary: Option<String>,
    #[serde(rename = "x-ms-dynamic-values", default)]
    pub dynamic_values: Option<DynamicValues>,
}

/// Dataset-level capability description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub kind: DatasetKind,
    pub dataset_format: Option<String>,
    pub parameters: Vec<MetadataParameter>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSource {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    url_encoding: Option<String>,
    #[serde(default)]
    table_display_name: Option<String>,
    #[serde(default)]
    table_plural_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDatasetMetadata {
    #[serde(default)]
    tabular: Option<RawSource>,
    #[serde(default)]
    blob: Option<RawSource>,
    #[serde(default)]
    dataset_format: Option<String>,
    #[serde(default)]
    parameters: Vec<MetadataParameter>,
}

impl DatasetMetadata {
    /// Parse the `$metadata.json/datasets` document
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let raw: RawDatasetMetadata = serde_json::from_value(value.clone())?;

        let kind = match (raw.tabular, raw.blob) {
            (Some(tabular), _) => DatasetKind::Tabular(TabularMetadata {
                source: TableSource::parse(tabular.source),
                display_name: tabular.display_name.none_if_empty(),
                url_encoding: UrlEncoding::parse(tabular.url_encoding.as_deref()),
                table_display_name: tabular.table_display_name.none_if_empty(),
                table_plural_name: tabular.table_plural_name.none_if_empty(),
            }),
            (None, Some(blob)) => DatasetKind::Blob(BlobMetadata {
                source: TableSource::parse(blob.source),
                display_name: blob.display_name.none_if_empty(),
                url_encoding: UrlEncoding::parse(blob.url_encoding.as_deref()),
            }),
            (None, None) => DatasetKind::Unknown,
        };

        Ok(Self {
            kind,
            dataset_format: raw.dataset_format.none_if_empty(),
            parameters: raw.parameters,
        })
    }

    /// Metadata for a backend that needs no dataset description
    pub fn unknown() -> Self {
        Self {
            kind: DatasetKind::Unknown,
            dataset_format: None,
            parameters: Vec::new(),
        }
    }

    pub fn is_tabular(&self) -> bool {
        matches!(self.kind, DatasetKind::Tabular(_))
    }

    pub fn is_blob(&self) -> bool {
        matches!(self.kind, DatasetKind::Blob(_))
    }

    /// Encoding applied to dataset and table route segments
    pub fn url_encoding(&self) -> UrlEncoding {
        match &self.kind {
            DatasetKind::Tabular(tabular) => tabular.url_encoding,
            DatasetKind::Blob(blob) => blob.url_encoding,
            DatasetKind::Unknown => UrlEncoding::Single,
        }
    }

    /// Where tables are enumerated from, if declared
    pub fn table_source(&self) -> Option<&TableSource> {
        match &self.kind {
            DatasetKind::Tabular(tabular) => tabular.source.as_ref(),
            DatasetKind::Blob(blob) => blob.source.as_ref(),
            DatasetKind::Unknown => None,
        }
    }

    /// Look up a dataset parameter by name
    pub fn parameter(&self, name: &str) -> Option<&MetadataParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}
