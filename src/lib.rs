// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # CDP Tabular
//!
//! Metadata resolution, caching and query delegation for tabular connector
//! data sources.
//!
//! ## Features
//!
//! - **Schema Resolution**: dataset metadata, table listing and table schemas
//!   (columns, types, enums, relationships) parsed from the connector backend
//! - **At-Most-Once Fetching**: concurrent resolutions of the same table share
//!   one network fetch
//! - **OData Delegation**: compile filter/sort/top/select/count/apply requests
//!   into the exact query string, rejecting anything the backend did not declare
//! - **Arrow Output**: query results as Arrow `RecordBatch`es
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cdp_tabular::config::load_config;
//! use cdp_tabular::delegation::{DelegationRequest, OrderBy};
//! use cdp_tabular::http::HttpTransport;
//! use cdp_tabular::resolver::{DatasetDescriptor, TableResolver};
//! use cdp_tabular::transport::{Logger, TracingLogger, Transport};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> cdp_tabular::Result<()> {
//!     let config = load_config("connection.yaml")?;
//!     let transport: Arc<dyn Transport> =
//!         Arc::new(HttpTransport::with_config(config.http_client_config())?);
//!     let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
//!
//!     let metadata = TableResolver::get_dataset_metadata(&config, &transport, &logger).await?;
//!     let resolver = TableResolver::new(
//!         DatasetDescriptor::from_parts("server", "database"),
//!         metadata,
//!         &config,
//!     )?;
//!
//!     let customers = resolver.get_table("Customers", &transport, &logger).await?;
//!     let rows = resolver
//!         .get_row_source(&customers)?
//!         .query(
//!             transport.as_ref(),
//!             logger.as_ref(),
//!             &DelegationRequest::new()
//!                 .with_filter("score gt 5")
//!                 .with_order_by(OrderBy::desc("score"))
//!                 .with_top(10),
//!         )
//!         .await?;
//!     println!("{} rows", rows.batch.num_rows());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        TableResolver                         │
//! │  list_tables() → [TableDescriptor]   init() → TableSchema    │
//! │  get_row_source() → RowSource → query() → RecordBatch        │
//! └──────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────┬────────────────┴─┬──────────────┬──────────────┐
//! │  Metadata   │  MetadataCache   │  Delegation  │  Transport   │
//! ├─────────────┼──────────────────┼──────────────┼──────────────┤
//! │ Dataset     │ claim slot       │ feature bits │ HTTP         │
//! │ Tables      │ shared fetch     │ $select ...  │ Retry        │
//! │ Schema      │ evict on failure │ $apply       │ Rate Limit   │
//! │ Foreign keys│                  │              │ Logger       │
//! └─────────────┴──────────────────┴──────────────┴──────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Connection configuration
pub mod config;

/// Transport and logger collaborators
pub mod transport;

/// HTTP client with retry and rate limiting
pub mod http;

/// Shared-fetch metadata cache
pub mod cache;

/// Backend metadata documents
pub mod metadata;

/// Dataset and table resolution
pub mod resolver;

/// OData delegation
pub mod delegation;

/// Arrow output
pub mod output;

/// Queryable row sources
pub mod rowsource;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use cache::MetadataCache;
pub use config::{load_config, load_config_from_str, ConnectionConfig};
pub use delegation::{DelegationCompiler, DelegationFeature, DelegationFeatures, DelegationRequest};
pub use resolver::{DatasetDescriptor, TableDescriptor, TableResolver};
pub use rowsource::{QueryResult, RowSource};
pub use transport::{Logger, TracingLogger, Transport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
