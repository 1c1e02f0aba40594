//! Table schema (`$metadata.json/datasets/{dataset}/tables/{table}`)

use crate::delegation::{DelegationFeature, DelegationFeatures};
use crate::error::{Error, Result};
use crate::transport::Logger;
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column type, from the backend's `type` and `format`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    String,
    Integer,
    Number,
    Boolean,
    DateTime,
    Date,
    Guid,
    Binary,
    Array,
    Object,
    Unknown(String),
}

impl ColumnType {
    fn from_wire(json_type: Option<&str>, format: Option<&str>) -> Self {
        match (json_type, format) {
            (Some("string"), Some("date-time")) => ColumnType::DateTime,
            (Some("string"), Some("date")) => ColumnType::Date,
            (Some("string"), Some("uuid" | "guid")) => ColumnType::Guid,
            (Some("string"), Some("byte" | "binary")) => ColumnType::Binary,
            (Some("string"), _) => ColumnType::String,
            (Some("integer"), _) => ColumnType::Integer,
            (Some("number"), _) => ColumnType::Number,
            (Some("boolean"), _) => ColumnType::Boolean,
            (Some("array"), _) => ColumnType::Array,
            (Some("object"), _) => ColumnType::Object,
            (Some(other), _) => ColumnType::Unknown(other.to_string()),
            (None, _) => ColumnType::Unknown(String::new()),
        }
    }
}

/// Enum / option-set values of a column
///
/// When present, `display_names` is positionally aligned with `values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMetadata {
    pub values: Vec<JsonValue>,
    pub display_names: Option<Vec<String>>,
}

impl EnumMetadata {
    /// Display name for a raw value
    pub fn display_name_of(&self, value: &JsonValue) -> Option<&str> {
        let index = self.values.iter().position(|v| v == value)?;
        self.display_names
            .as_ref()
            .and_then(|names| names.get(index))
            .map(String::as_str)
    }
}

/// Column that references another table
///
/// Following the reference needs a separate `init` of the target table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalTableRef {
    /// Wire name of the referenced table
    pub table: String,
    /// Referenced column in the target table
    pub foreign_key: Option<String>,
    /// Constraint name, when the backend reports one
    pub constraint: Option<String>,
}

/// One column pair of a referential constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferentialConstraint {
    pub constraint: String,
    pub column: String,
    pub referenced_column: String,
}

/// A single column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub logical_name: String,
    pub display_name: String,
    pub column_type: ColumnType,
    pub required: bool,
    /// Part of the table's primary key (`x-ms-keyType: primary`)
    pub primary_key: bool,
    pub sortable: bool,
    pub filter_functions: Vec<String>,
    pub enum_metadata: Option<EnumMetadata>,
    pub external_table: Option<ExternalTableRef>,
}

impl ColumnDescriptor {
    pub fn is_enum(&self) -> bool {
        self.enum_metadata.is_some()
    }
}

/// Delegation capabilities declared on a table (`x-ms-capabilities`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCapabilities {
    pub filterable: bool,
    pub sortable: bool,
    pub selectable: bool,
    pub countable: bool,
    pub server_paging_only: bool,
    pub filter_functions: Vec<String>,
    pub unsortable_columns: Vec<String>,
    pub non_filterable_columns: Vec<String>,
}

impl Default for TableCapabilities {
    fn default() -> Self {
        Self {
            filterable: true,
            sortable: true,
            selectable: true,
            countable: true,
            server_paging_only: false,
            filter_functions: Vec::new(),
            unsortable_columns: Vec::new(),
            non_filterable_columns: Vec::new(),
        }
    }
}

impl TableCapabilities {
    fn from_wire(raw: Option<&JsonValue>) -> Self {
        let mut caps = Self::default();
        let Some(raw) = raw.and_then(JsonValue::as_object) else {
            return caps;
        };

        if let Some(sort) = raw.get("sortRestrictions") {
            caps.sortable = flag(sort, "sortable", true);
            caps.unsortable_columns = strings(sort.get("unsortableProperties"));
        }
        if let Some(filter) = raw.get("filterRestrictions") {
            caps.filterable = flag(filter, "filterable", true);
            caps.non_filterable_columns = strings(filter.get("nonFilterableProperties"));
        }
        if let Some(select) = raw.get("selectRestrictions") {
            caps.selectable = flag(select, "selectable", true);
        }
        if let Some(count) = raw.get("countRestrictions") {
            caps.countable = flag(count, "countable", true);
        }
        caps.server_paging_only = raw
            .get("isOnlyServerPagable")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false);
        caps.filter_functions = strings(raw.get("filterFunctionSupport"));
        caps
    }

    /// Delegation features these capabilities allow
    pub fn supported_features(&self) -> DelegationFeatures {
        let mut features = DelegationFeatures::empty();
        if self.filterable {
            features.insert(DelegationFeature::Filter);
        }
        if self.sortable {
            features.insert(DelegationFeature::Sort);
        }
        if self.selectable {
            features.insert(DelegationFeature::Columns);
        }
        if self.countable {
            features.insert(DelegationFeature::Count);
        }
        if !self.server_paging_only {
            features.insert(DelegationFeature::Top);
        }
        features
    }
}

/// Resolved shape of a table
///
/// Column logical names are unique; a display name may equal another
/// column's logical name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub display_name: String,
    pub read_only: bool,
    pub columns: Vec<ColumnDescriptor>,
    pub capabilities: TableCapabilities,
    /// Target table -> constraint column pairs
    pub relationships: BTreeMap<String, Vec<ReferentialConstraint>>,
}

impl TableSchema {
    /// Column by logical name
    pub fn column(&self, logical_name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.logical_name == logical_name)
    }

    pub(crate) fn column_mut(&mut self, logical_name: &str) -> Option<&mut ColumnDescriptor> {
        self.columns
            .iter_mut()
            .find(|c| c.logical_name == logical_name)
    }

    /// Column by display name; a logical-name match wins over a display-name match
    pub fn column_by_display_name(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.column(name)
            .or_else(|| self.columns.iter().find(|c| c.display_name == name))
    }

    /// Columns the backend marks as required
    pub fn required_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.required)
    }

    /// Logical names of the primary-key columns, in column order
    pub fn primary_keys(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.logical_name.as_str())
            .collect()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Delegation features declared for this table
    pub fn supported_features(&self) -> DelegationFeatures {
        self.capabilities.supported_features()
    }
}

fn flag(value: &JsonValue, key: &str, default: bool) -> bool {
    value.get(key).and_then(JsonValue::as_bool).unwrap_or(default)
}

fn strings(value: Option<&JsonValue>) -> Vec<String> {
    value
        .and_then(JsonValue::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Parse a table metadata document
///
/// Enum metadata whose display list does not line up with its values is
/// dropped and reported through `logger`.
pub fn parse_table_schema(
    table_name: &str,
    document: &JsonValue,
    logger: &dyn Logger,
) -> Result<TableSchema> {
    let items = document
        .pointer("/schema/items")
        .and_then(JsonValue::as_object)
        .ok_or_else(|| Error::malformed("table schema", format!("'{table_name}' has no schema.items")))?;

    let properties = items
        .get("properties")
        .and_then(JsonValue::as_object)
        .cloned()
        .unwrap_or_default();
    let required = strings(items.get("required"));

    let columns = properties
        .iter()
        .map(|(name, property)| parse_column(table_name, name, property, &required, logger))
        .collect();

    let display_name = document
        .get("title")
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(table_name)
        .to_string();
    let read_only = document
        .get("x-ms-permission")
        .and_then(JsonValue::as_str)
        .is_some_and(|p| p.eq_ignore_ascii_case("read-only"));

    Ok(TableSchema {
        name: table_name.to_string(),
        display_name,
        read_only,
        columns,
        capabilities: TableCapabilities::from_wire(document.get("x-ms-capabilities")),
        relationships: BTreeMap::new(),
    })
}

fn parse_column(
    table_name: &str,
    name: &str,
    property: &JsonValue,
    required: &[String],
    logger: &dyn Logger,
) -> ColumnDescriptor {
    let empty = JsonObject::new();
    let property = property.as_object().unwrap_or(&empty);
    let text = |key: &str| property.get(key).and_then(JsonValue::as_str);

    let sortable = !matches!(text("x-ms-sort"), Some(sort) if sort.eq_ignore_ascii_case("none"));
    let filter_functions = strings(
        property
            .get("x-ms-capabilities")
            .and_then(|caps| caps.get("filterFunctions")),
    );

    ColumnDescriptor {
        logical_name: name.to_string(),
        display_name: text("title")
            .filter(|t| !t.is_empty())
            .unwrap_or(name)
            .to_string(),
        column_type: ColumnType::from_wire(text("type"), text("format")),
        required: required.iter().any(|r| r == name),
        primary_key: matches!(text("x-ms-keyType"), Some(key) if key.eq_ignore_ascii_case("primary")),
        sortable,
        filter_functions,
        enum_metadata: parse_enum(table_name, name, property, logger),
        external_table: None,
    }
}

fn parse_enum(
    table_name: &str,
    column: &str,
    property: &JsonObject,
    logger: &dyn Logger,
) -> Option<EnumMetadata> {
    let values = property.get("enum")?.as_array()?.clone();

    let display_names = match property.get("x-ms-enum-display-name") {
        None => None,
        Some(raw) => {
            let names = strings(Some(raw));
            if names.len() != values.len() {
                let err = Error::schema_inconsistency(
                    table_name,
                    format!(
                        "column '{column}' has {} enum values but {} display names; ignoring enum metadata",
                        values.len(),
                        names.len()
                    ),
                );
                logger.warn(&err.to_string());
                return None;
            }
            Some(names)
        }
    };

    Some(EnumMetadata {
        values,
        display_names,
    })
}
