//! Table listing (`datasets/{dataset}/tables`)

use crate::error::{Error, Result};
use crate::types::{JsonValue, OptionStringExt};
use serde::Deserialize;

/// One table as returned by the listing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableListEntry {
    /// Wire name used in routes
    pub name: String,
    /// Human-facing name; the wire name when the backend sends none
    pub display_name: String,
}

#[derive(Deserialize)]
struct RawTable {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "DisplayName", default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct RawTableList {
    #[serde(default)]
    value: Vec<RawTable>,
}

/// Parse a table listing; a document without `value` lists zero tables
pub fn parse_table_list(value: &JsonValue) -> Result<Vec<TableListEntry>> {
    if !value.is_object() {
        return Err(Error::malformed("table list", "expected a JSON object"));
    }
    let raw: RawTableList = serde_json::from_value(value.clone())
        .map_err(|e| Error::malformed("table list", e.to_string()))?;

    Ok(raw
        .value
        .into_iter()
        .map(|table| {
            let display_name = table
                .display_name
                .none_if_empty()
                .unwrap_or_else(|| table.name.clone());
            TableListEntry {
                name: table.name,
                display_name,
            }
        })
        .collect())
}
