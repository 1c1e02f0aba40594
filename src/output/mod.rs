//! Output module
//!
//! Maps resolved table schemas onto Arrow and converts the JSON rows the
//! backend returns into Arrow `RecordBatch`es.
//!
//! # Overview
//!
//! - `arrow_schema` - Arrow schema for a table, with optional projection
//! - `aggregate_schema` - Arrow schema for an `$apply` result
//! - `json_to_arrow` / `arrow_to_json` - row conversion

mod convert;
mod schema;

pub use convert::{arrow_to_json, json_to_arrow};
pub use schema::{aggregate_schema, arrow_schema, column_data_type, DISPLAY_NAME_KEY};
