//! Dataset and table resolution over a transport

use super::descriptor::{DatasetDescriptor, TableDescriptor};
use super::routes::Routes;
use crate::cache::MetadataCache;
use crate::config::{ConnectionConfig, RelationshipSource};
use crate::error::{Error, Result};
use crate::metadata::{
    apply_foreign_keys, foreign_key_query, parse_foreign_keys, parse_table_list,
    parse_table_schema, DatasetMetadata, TableSchema,
};
use crate::rowsource::RowSource;
use crate::transport::{Logger, Transport, TransportRequest};
use crate::types::JsonValue;
use serde_json::json;
use std::sync::Arc;

/// Resolves the tables of one dataset
///
/// Owns the schema cache for the dataset. Schemas are fetched at most once
/// per table until [`clear_cache`](Self::clear_cache).
#[derive(Debug)]
pub struct TableResolver {
    dataset: DatasetDescriptor,
    dataset_metadata: DatasetMetadata,
    relationships: RelationshipSource,
    routes: Routes,
    cache: MetadataCache<TableSchema>,
}

impl TableResolver {
    /// Fetch the connection's dataset metadata
    ///
    /// Not memoized here; callers that need it repeatedly keep the result.
    pub async fn get_dataset_metadata(
        config: &ConnectionConfig,
        transport: &Arc<dyn Transport>,
        logger: &Arc<dyn Logger>,
    ) -> Result<DatasetMetadata> {
        config.validate()?;
        let path = Routes::dataset_metadata(config);
        logger.debug(&format!("fetching dataset metadata: {path}"));

        let document = get_json(transport.as_ref(), path).await?;
        DatasetMetadata::from_json(&document)
    }

    pub fn new(
        dataset: DatasetDescriptor,
        dataset_metadata: DatasetMetadata,
        config: &ConnectionConfig,
    ) -> Result<Self> {
        config.validate()?;
        let routes = Routes::new(config, dataset_metadata.url_encoding());
        Ok(Self {
            dataset,
            dataset_metadata,
            relationships: config.relationships,
            routes,
            cache: MetadataCache::new(),
        })
    }

    pub fn dataset(&self) -> &DatasetDescriptor {
        &self.dataset
    }

    pub fn dataset_metadata(&self) -> &DatasetMetadata {
        &self.dataset_metadata
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// List the dataset's tables, all uninitialized
    pub async fn list_tables(
        &self,
        transport: &Arc<dyn Transport>,
        logger: &Arc<dyn Logger>,
    ) -> Result<Vec<TableDescriptor>> {
        let path = self.routes.tables(self.dataset.as_str());
        logger.debug(&format!("listing tables of '{}'", self.dataset));

        let document = get_json(transport.as_ref(), path).await?;
        let tables: Vec<TableDescriptor> = parse_table_list(&document)?
            .into_iter()
            .map(TableDescriptor::from)
            .collect();

        logger.info(&format!(
            "dataset '{}' has {} tables",
            self.dataset,
            tables.len()
        ));
        Ok(tables)
    }

    /// Resolve the schema of `table` and attach it
    ///
    /// Concurrent calls for the same table share one fetch. On failure the
    /// descriptor is left as it was.
    pub async fn init(
        &self,
        table: &mut TableDescriptor,
        transport: &Arc<dyn Transport>,
        logger: &Arc<dyn Logger>,
    ) -> Result<()> {
        let key = self.routes.table_schema(self.dataset.as_str(), &table.name);

        let fetch = SchemaFetch {
            schema_path: key.clone(),
            query_path: self.routes.sql_query(self.dataset.as_str()),
            table: table.name.clone(),
            relationships: self.relationships,
            transport: Arc::clone(transport),
            logger: Arc::clone(logger),
        };
        let schema = self.cache.get_or_fetch(&key, move || fetch.run()).await?;

        table.attach(schema);
        Ok(())
    }

    /// Find a table by wire name, else by display name, and initialize it
    ///
    /// With duplicate display names the first table in listing order wins.
    pub async fn get_table(
        &self,
        name: &str,
        transport: &Arc<dyn Transport>,
        logger: &Arc<dyn Logger>,
    ) -> Result<TableDescriptor> {
        let tables = self.list_tables(transport, logger).await?;
        let mut table = tables
            .iter()
            .find(|t| t.name == name)
            .or_else(|| super::find_table_by_display_name(&tables, name))
            .cloned()
            .ok_or_else(|| Error::table_not_found(name))?;

        self.init(&mut table, transport, logger).await?;
        Ok(table)
    }

    /// Queryable handle for an initialized table
    pub fn get_row_source(&self, table: &TableDescriptor) -> Result<RowSource> {
        let schema = table.require_schema()?;
        Ok(RowSource::new(
            Arc::clone(schema),
            self.dataset.clone(),
            self.routes.clone(),
        ))
    }

    /// Drop every cached schema without touching the network
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &MetadataCache<TableSchema> {
        &self.cache
    }
}

/// Everything one schema fetch needs, owned so it can outlive the caller
struct SchemaFetch {
    schema_path: String,
    query_path: String,
    table: String,
    relationships: RelationshipSource,
    transport: Arc<dyn Transport>,
    logger: Arc<dyn Logger>,
}

impl SchemaFetch {
    async fn run(self) -> Result<TableSchema> {
        self.logger
            .debug(&format!("fetching schema of '{}'", self.table));
        let document = get_json(self.transport.as_ref(), self.schema_path).await?;
        let mut schema = parse_table_schema(&self.table, &document, self.logger.as_ref())?;

        match self.relationships {
            RelationshipSource::None => {}
            RelationshipSource::SqlForeignKeys => {
                let body = json!({ "query": foreign_key_query(&self.table) });
                let response = self
                    .transport
                    .send(TransportRequest::post_json(self.query_path, &body))
                    .await?
                    .error_for_status()?;
                let rows = parse_foreign_keys(&response.json::<JsonValue>()?)?;
                self.logger.debug(&format!(
                    "'{}' has {} foreign key columns",
                    self.table,
                    rows.len()
                ));
                apply_foreign_keys(&mut schema, rows, self.logger.as_ref());
            }
        }

        Ok(schema)
    }
}

async fn get_json(transport: &dyn Transport, path: String) -> Result<JsonValue> {
    transport
        .send(TransportRequest::get(path))
        .await?
        .error_for_status()?
        .json()
}
