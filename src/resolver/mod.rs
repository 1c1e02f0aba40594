//! Table resolution
//!
//! Turns a dataset into table descriptors and a table descriptor into a
//! resolved, queryable schema.
//!
//! # Overview
//!
//! - `TableResolver` - list, init and wrap tables of one dataset
//! - `DatasetDescriptor` / `TableDescriptor` - what is being resolved
//! - `Routes` - connector request paths
//!
//! Following a foreign key is two steps: `resolve_external_table` reads the
//! reference from the resolved schema, and a separate `init` on the target
//! table fetches its schema. Resolution never cascades on its own.

mod descriptor;
mod routes;
mod table_resolver;

pub use descriptor::{find_table_by_display_name, DatasetDescriptor, TableDescriptor};
pub use routes::{Routes, SCHEMA_API_VERSION};
pub use table_resolver::TableResolver;
