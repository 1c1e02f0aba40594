//! Tests for metadata parsing

use super::*;
use crate::delegation::DelegationFeature;
use crate::testing::RecordingLogger;
use crate::transport::TracingLogger;
use pretty_assertions::assert_eq;
use serde_json::json;

fn customers_document() -> serde_json::Value {
    json!({
        "name": "Customers",
        "title": "Customer Accounts",
        "x-ms-permission": "read-write",
        "schema": {
            "type": "array",
            "items": {
                "type": "object",
                "required": ["id", "name"],
                "properties": {
                    "id": {
                        "title": "Id",
                        "type": "integer",
                        "format": "int64",
                        "x-ms-keyType": "primary",
                        "x-ms-sort": "asc,desc"
                    },
                    "name": {
                        "title": "Full Name",
                        "type": "string",
                        "x-ms-capabilities": { "filterFunctions": ["startswith", "eq"] }
                    },
                    "created": {
                        "type": "string",
                        "format": "date-time",
                        "x-ms-sort": "none"
                    },
                    "tier": {
                        "title": "Tier",
                        "type": "integer",
                        "enum": [1, 2, 3],
                        "x-ms-enum-display-name": ["Bronze", "Silver", "Gold"]
                    }
                }
            }
        }
    })
}

// ============================================================================
// Dataset Metadata Tests
// ============================================================================

#[test]
fn test_dataset_metadata_tabular() {
    let doc = json!({
        "tabular": {
            "source": "mru",
            "displayName": "dataset",
            "urlEncoding": "double",
            "tableDisplayName": "Table name",
            "tablePluralName": "Tables"
        },
        "blob": { "source": "singleton", "displayName": "Blob", "urlEncoding": "single" },
        "datasetFormat": "{server},{database}"
    });

    let metadata = DatasetMetadata::from_json(&doc).unwrap();

    assert!(metadata.is_tabular());
    assert!(!metadata.is_blob());
    assert_eq!(metadata.url_encoding(), UrlEncoding::Double);
    assert_eq!(metadata.table_source(), Some(&TableSource::Mru));
    assert_eq!(metadata.dataset_format.as_deref(), Some("{server},{database}"));

    let DatasetKind::Tabular(tabular) = &metadata.kind else {
        panic!("expected tabular dataset, got {:?}", metadata.kind);
    };
    assert_eq!(tabular.table_display_name.as_deref(), Some("Table name"));
    assert_eq!(tabular.table_plural_name.as_deref(), Some("Tables"));
}

#[test]
fn test_dataset_metadata_blob() {
    let doc = json!({
        "blob": { "source": "singleton", "displayName": "site", "urlEncoding": "single" }
    });

    let metadata = DatasetMetadata::from_json(&doc).unwrap();

    assert!(metadata.is_blob());
    assert_eq!(metadata.url_encoding(), UrlEncoding::Single);
    assert_eq!(metadata.table_source(), Some(&TableSource::Singleton));
}

#[test]
fn test_dataset_metadata_unknown() {
    let metadata = DatasetMetadata::from_json(&json!({})).unwrap();
    assert_eq!(metadata.kind, DatasetKind::Unknown);
    assert_eq!(metadata.url_encoding(), UrlEncoding::Single);
    assert!(metadata.table_source().is_none());
    assert_eq!(metadata, DatasetMetadata::unknown());
}

#[test]
fn test_dataset_metadata_other_source() {
    let doc = json!({ "tabular": { "source": "catalog" } });
    let metadata = DatasetMetadata::from_json(&doc).unwrap();
    assert_eq!(
        metadata.table_source(),
        Some(&TableSource::Other("catalog".to_string()))
    );
}

#[test]
fn test_dataset_metadata_parameters() {
    let doc = json!({
        "tabular": { "source": "mru", "urlEncoding": "double" },
        "parameters": [
            {
                "name": "server",
                "type": "string",
                "required": true,
                "urlEncoding": "double",
                "description": "Server name.",
                "x-ms-summary": "Server name",
                "x-ms-dynamic-values": {
                    "path": "/v2/datasets",
                    "value-collection": "value",
                    "value-path": "Name",
                    "value-title": "DisplayName"
                }
            },
            { "name": "database", "type": "string", "required": true }
        ]
    });

    let metadata = DatasetMetadata::from_json(&doc).unwrap();
    assert_eq!(metadata.parameters.len(), 2);

    let server = metadata.parameter("server").unwrap();
    assert!(server.required);
    assert_eq!(server.summary.as_deref(), Some("Server name"));
    assert_eq!(
        server.dynamic_values,
        Some(DynamicValues {
            path: "/v2/datasets".to_string(),
            value_collection: Some("value".to_string()),
            value_path: Some("Name".to_string()),
            value_title: Some("DisplayName".to_string()),
        })
    );

    let database = metadata.parameter("database").unwrap();
    assert!(database.dynamic_values.is_none());
    assert!(metadata.parameter("missing").is_none());
}

#[test]
fn test_url_encoding_encode() {
    assert_eq!(UrlEncoding::Single.encode("a b/c"), "a%20b%2Fc");
    assert_eq!(UrlEncoding::Double.encode("a b/c"), "a%2520b%252Fc");
    assert_eq!(UrlEncoding::Single.encode("default"), "default");
}

// ============================================================================
// Table Listing Tests
// ============================================================================

#[test]
fn test_parse_table_list() {
    let doc = json!({
        "value": [
            { "Name": "[dbo].[Customers]", "DisplayName": "Customers" },
            { "Name": "[dbo].[Products]" },
            { "Name": "[dbo].[Orders]", "DisplayName": "" }
        ]
    });

    let tables = parse_table_list(&doc).unwrap();

    assert_eq!(
        tables,
        vec![
            TableListEntry {
                name: "[dbo].[Customers]".to_string(),
                display_name: "Customers".to_string(),
            },
            TableListEntry {
                name: "[dbo].[Products]".to_string(),
                display_name: "[dbo].[Products]".to_string(),
            },
            TableListEntry {
                name: "[dbo].[Orders]".to_string(),
                display_name: "[dbo].[Orders]".to_string(),
            },
        ]
    );
}

#[test]
fn test_parse_table_list_empty() {
    assert!(parse_table_list(&json!({ "value": [] })).unwrap().is_empty());
    assert!(parse_table_list(&json!({})).unwrap().is_empty());
}

#[test]
fn test_parse_table_list_rejects_non_object() {
    let err = parse_table_list(&json!([1, 2])).unwrap_err();
    assert!(matches!(err, crate::Error::MalformedMetadata { .. }));
}

// ============================================================================
// Table Schema Tests
// ============================================================================

#[test]
fn test_parse_table_schema_columns() {
    let schema = parse_table_schema("Customers", &customers_document(), &TracingLogger).unwrap();

    assert_eq!(schema.name, "Customers");
    assert_eq!(schema.display_name, "Customer Accounts");
    assert!(!schema.is_read_only());

    let names: Vec<_> = schema.columns.iter().map(|c| c.logical_name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "created", "tier"]);

    let id = schema.column("id").unwrap();
    assert_eq!(id.column_type, ColumnType::Integer);
    assert!(id.required);
    assert!(id.primary_key);
    assert!(id.sortable);

    let name = schema.column("name").unwrap();
    assert_eq!(name.display_name, "Full Name");
    assert_eq!(name.filter_functions, vec!["startswith", "eq"]);

    let created = schema.column("created").unwrap();
    assert_eq!(created.column_type, ColumnType::DateTime);
    assert_eq!(created.display_name, "created");
    assert!(!created.required);
    assert!(!created.sortable);

    assert_eq!(schema.primary_keys(), vec!["id"]);
    let required: Vec<_> = schema.required_columns().map(|c| c.logical_name.as_str()).collect();
    assert_eq!(required, vec!["id", "name"]);
}

#[test]
fn test_parse_table_schema_enum() {
    let schema = parse_table_schema("Customers", &customers_document(), &TracingLogger).unwrap();

    let tier = schema.column("tier").unwrap();
    assert!(tier.is_enum());
    let enum_metadata = tier.enum_metadata.as_ref().unwrap();
    assert_eq!(enum_metadata.values, vec![json!(1), json!(2), json!(3)]);
    assert_eq!(enum_metadata.display_name_of(&json!(2)), Some("Silver"));
    assert_eq!(enum_metadata.display_name_of(&json!(9)), None);
}

#[test]
fn test_parse_table_schema_enum_without_display_names() {
    let doc = json!({
        "schema": { "items": { "properties": {
            "status": { "type": "string", "enum": ["open", "closed"] }
        }}}
    });

    let schema = parse_table_schema("Tickets", &doc, &TracingLogger).unwrap();
    let status = schema.column("status").unwrap();
    let enum_metadata = status.enum_metadata.as_ref().unwrap();
    assert_eq!(enum_metadata.values.len(), 2);
    assert!(enum_metadata.display_names.is_none());
    assert_eq!(enum_metadata.display_name_of(&json!("open")), None);
}

#[test]
fn test_parse_table_schema_enum_length_mismatch_dropped() {
    let doc = json!({
        "schema": { "items": { "properties": {
            "tier": {
                "type": "integer",
                "enum": [1, 2, 3],
                "x-ms-enum-display-name": ["Bronze", "Silver"]
            }
        }}}
    });
    let logger = RecordingLogger::default();

    let schema = parse_table_schema("Customers", &doc, &logger).unwrap();

    let tier = schema.column("tier").unwrap();
    assert!(!tier.is_enum());
    assert_eq!(tier.column_type, ColumnType::Integer);

    let warnings = logger.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Inconsistent schema for table 'Customers'"));
    assert!(warnings[0].contains("3 enum values but 2 display names"));
}

#[test]
fn test_display_name_collision() {
    // "code"'s display name is another column's logical name
    let doc = json!({
        "schema": { "items": { "properties": {
            "name": { "title": "Label", "type": "string" },
            "code": { "title": "name", "type": "string" }
        }}}
    });

    let schema = parse_table_schema("Things", &doc, &TracingLogger).unwrap();

    assert_eq!(schema.columns.len(), 2);
    assert_eq!(schema.column_by_display_name("name").unwrap().logical_name, "name");
    assert_eq!(schema.column_by_display_name("Label").unwrap().logical_name, "name");
    assert!(schema.column_by_display_name("missing").is_none());
}

#[test]
fn test_parse_table_schema_defaults() {
    let doc = json!({ "schema": { "items": {} } });

    let schema = parse_table_schema("Empty", &doc, &TracingLogger).unwrap();

    assert_eq!(schema.display_name, "Empty");
    assert!(schema.columns.is_empty());
    assert!(schema.relationships.is_empty());
    assert_eq!(schema.capabilities, TableCapabilities::default());
}

#[test]
fn test_parse_table_schema_missing_items() {
    let err = parse_table_schema("Broken", &json!({ "name": "Broken" }), &TracingLogger).unwrap_err();
    assert!(matches!(err, crate::Error::MalformedMetadata { .. }));
    assert!(err.to_string().contains("'Broken' has no schema.items"));
}

#[test]
fn test_column_type_mapping() {
    let doc = json!({
        "schema": { "items": { "properties": {
            "a": { "type": "string", "format": "date" },
            "b": { "type": "string", "format": "uuid" },
            "c": { "type": "string", "format": "byte" },
            "d": { "type": "number", "format": "double" },
            "e": { "type": "boolean" },
            "f": { "type": "array" },
            "g": { "type": "object" },
            "h": { "type": "geography" },
            "i": {}
        }}}
    });

    let schema = parse_table_schema("Types", &doc, &TracingLogger).unwrap();
    let types: Vec<_> = schema.columns.iter().map(|c| c.column_type.clone()).collect();

    assert_eq!(
        types,
        vec![
            ColumnType::Date,
            ColumnType::Guid,
            ColumnType::Binary,
            ColumnType::Number,
            ColumnType::Boolean,
            ColumnType::Array,
            ColumnType::Object,
            ColumnType::Unknown("geography".to_string()),
            ColumnType::Unknown(String::new()),
        ]
    );
}

#[test]
fn test_table_capabilities() {
    let mut doc = customers_document();
    doc["x-ms-permission"] = json!("read-only");
    doc["x-ms-capabilities"] = json!({
        "sortRestrictions": { "sortable": true, "unsortableProperties": ["created"] },
        "filterRestrictions": { "filterable": true, "nonFilterableProperties": ["tier"] },
        "selectRestrictions": { "selectable": false },
        "isOnlyServerPagable": true,
        "filterFunctionSupport": ["eq", "gt", "and"]
    });

    let schema = parse_table_schema("Customers", &doc, &TracingLogger).unwrap();
    let caps = &schema.capabilities;

    assert!(schema.is_read_only());
    assert!(caps.sortable);
    assert!(!caps.selectable);
    assert!(caps.server_paging_only);
    assert_eq!(caps.unsortable_columns, vec!["created"]);
    assert_eq!(caps.non_filterable_columns, vec!["tier"]);
    assert_eq!(caps.filter_functions, vec!["eq", "gt", "and"]);

    let features = schema.supported_features();
    assert!(features.contains(DelegationFeature::Filter));
    assert!(features.contains(DelegationFeature::Sort));
    assert!(features.contains(DelegationFeature::Count));
    assert!(!features.contains(DelegationFeature::Columns));
    assert!(!features.contains(DelegationFeature::Top));
}

#[test]
fn test_default_capabilities_features() {
    let features = TableCapabilities::default().supported_features();
    for feature in [
        DelegationFeature::Filter,
        DelegationFeature::Top,
        DelegationFeature::Columns,
        DelegationFeature::Sort,
        DelegationFeature::Count,
    ] {
        assert!(features.contains(feature), "{feature:?} should be supported");
    }
    assert!(!features.contains(DelegationFeature::ApplyGroupBy));
}

// ============================================================================
// Relationship Tests
// ============================================================================

fn orders_schema() -> TableSchema {
    let doc = json!({
        "schema": { "items": { "properties": {
            "id": { "type": "integer" },
            "customer_id": { "type": "integer" },
            "product_id": { "type": "integer" }
        }}}
    });
    parse_table_schema("[dbo].[Orders]", &doc, &TracingLogger).unwrap()
}

fn fk_row(parent: &str, column: &str, target: &str, target_column: &str) -> serde_json::Value {
    json!({
        "FK_Name": format!("FK_{column}"),
        "Parent_Table": parent,
        "Column_Name": column,
        "Referenced_Table": target,
        "Referenced_Column": target_column
    })
}

#[test]
fn test_foreign_key_query() {
    let query = foreign_key_query("[dbo].[Orders]");
    assert!(query.starts_with("select fk.name as FK_Name"));
    assert!(query.ends_with("= '[dbo].[Orders]'"));

    let quoted = foreign_key_query("[dbo].[O'Brien]");
    assert!(quoted.ends_with("= '[dbo].[O''Brien]'"));
}

#[test]
fn test_parse_foreign_keys() {
    let doc = json!({
        "ResultSets": {
            "Table1": [fk_row("[dbo].[Orders]", "customer_id", "[dbo].[Customers]", "id")]
        }
    });

    let rows = parse_foreign_keys(&doc).unwrap();

    assert_eq!(
        rows,
        vec![ForeignKeyRow {
            constraint: "FK_customer_id".to_string(),
            parent_table: "[dbo].[Orders]".to_string(),
            column: "customer_id".to_string(),
            referenced_table: "[dbo].[Customers]".to_string(),
            referenced_column: "id".to_string(),
        }]
    );
}

#[test]
fn test_parse_foreign_keys_without_result_sets() {
    assert!(parse_foreign_keys(&json!({})).unwrap().is_empty());
    assert!(parse_foreign_keys(&json!({ "ResultSets": {} })).unwrap().is_empty());
}

#[test]
fn test_parse_foreign_keys_malformed_rows() {
    let doc = json!({ "ResultSets": { "Table1": [{ "FK_Name": 1 }] } });
    let err = parse_foreign_keys(&doc).unwrap_err();
    assert!(matches!(err, crate::Error::MalformedMetadata { .. }));
}

#[test]
fn test_apply_foreign_keys() {
    let mut schema = orders_schema();
    let rows = parse_foreign_keys(&json!({
        "ResultSets": { "Table1": [
            fk_row("[dbo].[Orders]", "customer_id", "[dbo].[Customers]", "id"),
            fk_row("[dbo].[Orders]", "product_id", "[dbo].[Products]", "sku"),
            fk_row("[dbo].[Invoices]", "order_id", "[dbo].[Orders]", "id"),
            fk_row("[dbo].[Orders]", "ghost", "[dbo].[Ghosts]", "id")
        ]}
    }))
    .unwrap();
    let logger = RecordingLogger::default();

    apply_foreign_keys(&mut schema, rows, &logger);

    assert_eq!(
        schema.column("customer_id").unwrap().external_table,
        Some(ExternalTableRef {
            table: "[dbo].[Customers]".to_string(),
            foreign_key: Some("id".to_string()),
            constraint: Some("FK_customer_id".to_string()),
        })
    );
    assert_eq!(
        schema.column("product_id").unwrap().external_table.as_ref().unwrap().table,
        "[dbo].[Products]"
    );
    assert!(schema.column("id").unwrap().external_table.is_none());

    let targets: Vec<_> = schema.relationships.keys().cloned().collect();
    assert_eq!(targets, vec!["[dbo].[Customers]", "[dbo].[Products]"]);
    assert_eq!(
        schema.relationships["[dbo].[Customers]"],
        vec![ReferentialConstraint {
            constraint: "FK_customer_id".to_string(),
            column: "customer_id".to_string(),
            referenced_column: "id".to_string(),
        }]
    );

    let warnings = logger.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("unknown column 'ghost'"));
}
