//! Backend metadata documents
//!
//! Parses the JSON the connector backend returns into typed values. Nothing
//! here touches the network.
//!
//! # Overview
//!
//! - `DatasetMetadata` - dataset-level capabilities, decided once into a `DatasetKind`
//! - `TableListEntry` - one row of a table listing
//! - `TableSchema` - columns, types, enums, capabilities and relationships
//! - foreign-key rows from the SQL relationships query

mod dataset;
mod relationships;
mod schema;
mod tables;

pub use dataset::{
    BlobMetadata, DatasetKind, DatasetMetadata, DynamicValues, MetadataParameter, TableSource,
    TabularMetadata, UrlEncoding,
};
pub use relationships::{apply_foreign_keys, foreign_key_query, parse_foreign_keys, ForeignKeyRow};
pub use schema::{
    parse_table_schema, ColumnDescriptor, ColumnType, EnumMetadata, ExternalTableRef,
    ReferentialConstraint, TableCapabilities, TableSchema,
};
pub use tables::{parse_table_list, TableListEntry};

#[cfg(test)]
mod tests;
