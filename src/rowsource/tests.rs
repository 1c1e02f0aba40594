//! Tests for row sources

use super::*;
use crate::config::ConnectionConfig;
use crate::delegation::{AggregateMethod, Aggregation, DelegationFeature, OrderBy};
use crate::metadata::{parse_table_schema, UrlEncoding};
use crate::testing::{RecordingLogger, ScriptedTransport};
use crate::transport::TracingLogger;
use arrow::array::{Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use pretty_assertions::assert_eq;
use serde_json::json;

fn customers(capabilities: serde_json::Value) -> RowSource {
    let doc = json!({
        "x-ms-capabilities": capabilities,
        "schema": { "items": { "properties": {
            "id": { "type": "integer" },
            "name": { "type": "string" },
            "tier": { "type": "integer" }
        }}}
    });
    let schema = parse_table_schema("Customers", &doc, &TracingLogger).unwrap();
    let routes = Routes::new(&ConnectionConfig::new("/apim/sql/abc"), UrlEncoding::Single);
    RowSource::new(Arc::new(schema), DatasetDescriptor::default(), routes)
}

#[test]
fn test_row_source_features() {
    let source = customers(json!({}));
    assert_eq!(source.table_name(), "Customers");
    assert!(source.supported_features().contains(DelegationFeature::Top));

    let paged = customers(json!({ "isOnlyServerPagable": true }));
    assert!(!paged.supported_features().contains(DelegationFeature::Top));
}

#[test]
fn test_row_source_arrow_schema() {
    let schema = customers(json!({})).arrow_schema().unwrap();
    let fields: Vec<_> = schema
        .fields()
        .iter()
        .map(|f| (f.name().as_str(), f.data_type().clone()))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("id", DataType::Int64),
            ("name", DataType::Utf8),
            ("tier", DataType::Int64),
        ]
    );
}

#[test]
fn test_row_source_compile_respects_table_capabilities() {
    let source = customers(json!({ "sortRestrictions": { "sortable": false } }));
    let request = DelegationRequest::new().with_order_by(OrderBy::asc("name"));

    assert!(matches!(
        source.compile(&request),
        Err(Error::UnsupportedCapability { .. })
    ));
    assert_eq!(
        source
            .compile(&DelegationRequest::new().with_filter("tier eq 2"))
            .unwrap(),
        "$filter=tier+eq+2"
    );
}

#[tokio::test]
async fn test_query() {
    let source = customers(json!({}));
    let transport = ScriptedTransport::new();
    transport.push_json(json!({
        "@odata.count": 42,
        "value": [
            { "id": 1, "name": "Ada" },
            { "id": 2, "name": "Grace" }
        ]
    }));
    let request = DelegationRequest::new()
        .with_columns(["id", "name"])
        .with_top(2)
        .with_total_count();

    let result = source.query(&transport, &TracingLogger, &request).await.unwrap();

    assert_eq!(
        transport.paths(),
        vec!["/apim/sql/abc/datasets/default/tables/Customers/items?$select=id,name&$top=2&$count=true"]
    );
    assert_eq!(result.total_count, Some(42));
    assert_eq!(result.batch.num_rows(), 2);
    assert_eq!(result.batch.num_columns(), 2);
    let names = result
        .batch
        .column(1)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(names.value(1), "Grace");
}

#[tokio::test]
async fn test_query_without_value() {
    let source = customers(json!({}));
    let transport = ScriptedTransport::new();
    transport.push_json(json!({}));

    let result = source
        .query(&transport, &TracingLogger, &DelegationRequest::new())
        .await
        .unwrap();

    assert_eq!(result.batch.num_rows(), 0);
    assert_eq!(result.batch.num_columns(), 3);
    assert!(result.total_count.is_none());
    assert_eq!(
        transport.paths(),
        vec!["/apim/sql/abc/datasets/default/tables/Customers/items"]
    );
}

#[tokio::test]
async fn test_query_aggregate() {
    let source = customers(json!({}));
    let transport = ScriptedTransport::new();
    transport.push_json(json!({
        "value": [ { "tier": 1, "n": 10 }, { "tier": 2, "n": 4 } ]
    }));
    let request = DelegationRequest::new()
        .with_features(DelegationFeature::ApplyGroupBy | DelegationFeature::ApplyTopLevelAggregation);
    let request = request
        .with_group_by(["tier"])
        .with_aggregation(Aggregation::new(AggregateMethod::Count, "", "n"));

    // groupby/aggregate are not declared by default table capabilities
    let err = source.query(&transport, &TracingLogger, &request).await.unwrap_err();
    assert!(matches!(err, Error::UnsupportedCapability { .. }));
    assert_eq!(transport.call_count(), 0);

    let compiler_source = RowSource {
        compiler: DelegationCompiler::new(DelegationFeatures::all()),
        ..source
    };
    let result = compiler_source
        .query(&transport, &TracingLogger, &request)
        .await
        .unwrap();

    assert_eq!(transport.call_count(), 1);
    let counts = result
        .batch
        .column(1)
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    assert_eq!(counts.value(0), 10);
    assert_eq!(result.batch.schema().field(1).name(), "n");
}

#[tokio::test]
async fn test_query_unknown_column_is_network_free() {
    let source = customers(json!({}));
    let transport = ScriptedTransport::new();

    let select = DelegationRequest::new().with_columns(["ghost"]);
    let err = source.query(&transport, &TracingLogger, &select).await.unwrap_err();
    assert!(matches!(err, Error::ColumnNotFound { .. }));

    let sort = DelegationRequest::new().with_order_by(OrderBy::desc("ghost"));
    let err = source.query(&transport, &TracingLogger, &sort).await.unwrap_err();
    assert!(matches!(err, Error::ColumnNotFound { .. }));

    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_query_backend_error() {
    let source = customers(json!({}));
    let transport = ScriptedTransport::new();
    transport.push_status(400, "bad filter");
    let logger = RecordingLogger::default();

    let err = source
        .query(&transport, &logger, &DelegationRequest::new().with_filter("tier eq"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(logger.lines().iter().any(|(_, line)| line.contains("querying 'Customers'")));
}
