//! Row source
//!
//! A [`RowSource`] wraps the schema of an initialized table. It compiles
//! delegated queries against the table's declared features and runs them
//! through the transport.

use crate::delegation::{DelegationCompiler, DelegationFeatures, DelegationRequest};
use crate::error::{Error, Result};
use crate::metadata::TableSchema;
use crate::output::{aggregate_schema, arrow_schema, json_to_arrow};
use crate::resolver::{DatasetDescriptor, Routes};
use crate::transport::{Logger, Transport, TransportRequest};
use crate::types::JsonValue;
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use serde::Deserialize;
use std::sync::Arc;

/// Rows returned by one query
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub batch: RecordBatch,
    /// `@odata.count`, when the query asked for it and the backend sent it
    pub total_count: Option<u64>,
}

#[derive(Deserialize)]
struct ItemsPage {
    #[serde(default)]
    value: Vec<JsonValue>,
    #[serde(rename = "@odata.count", default)]
    count: Option<u64>,
}

/// Queryable handle over a resolved table
#[derive(Debug, Clone)]
pub struct RowSource {
    schema: Arc<TableSchema>,
    dataset: DatasetDescriptor,
    routes: Routes,
    compiler: DelegationCompiler,
}

impl RowSource {
    pub fn new(schema: Arc<TableSchema>, dataset: DatasetDescriptor, routes: Routes) -> Self {
        let compiler = DelegationCompiler::new(schema.supported_features());
        Self {
            schema,
            dataset,
            routes,
            compiler,
        }
    }

    pub fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    pub fn table_name(&self) -> &str {
        &self.schema.name
    }

    pub fn supported_features(&self) -> DelegationFeatures {
        self.compiler.supported()
    }

    /// Arrow schema of every column
    pub fn arrow_schema(&self) -> Result<Schema> {
        arrow_schema(&self.schema, None)
    }

    /// OData query string for `request`
    pub fn compile(&self, request: &DelegationRequest) -> Result<String> {
        self.compiler.compile(request)
    }

    /// Arrow schema of the rows `request` returns
    pub fn result_schema(&self, request: &DelegationRequest) -> Result<Schema> {
        if request.aggregations.is_empty() && request.group_by.is_empty() {
            arrow_schema(&self.schema, request.columns.as_deref())
        } else {
            aggregate_schema(&self.schema, &request.group_by, &request.aggregations)
        }
    }

    /// Run `request` against the backend
    ///
    /// The request is compiled and checked against the schema before any
    /// network call.
    pub async fn query(
        &self,
        transport: &dyn Transport,
        logger: &dyn Logger,
        request: &DelegationRequest,
    ) -> Result<QueryResult> {
        let query = self.compile(request)?;
        let result_schema = self.result_schema(request)?;
        self.check_columns(request)?;

        let path = self
            .routes
            .items(self.dataset.as_str(), &self.schema.name, &query);
        logger.debug(&format!("querying '{}': {path}", self.schema.name));

        let page: ItemsPage = transport
            .send(TransportRequest::get(path))
            .await?
            .error_for_status()?
            .json()?;

        let batch = json_to_arrow(&page.value, &result_schema)?;
        logger.debug(&format!(
            "'{}' returned {} rows",
            self.schema.name,
            batch.num_rows()
        ));

        Ok(QueryResult {
            batch,
            total_count: page.count,
        })
    }

    fn check_columns(&self, request: &DelegationRequest) -> Result<()> {
        let missing = request
            .order_by
            .iter()
            .map(|o| o.column.as_str())
            .find(|name| self.schema.column(name).is_none());
        match missing {
            Some(column) => Err(Error::column_not_found(&self.schema.name, column)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests;
