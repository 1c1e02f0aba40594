//! Foreign-key relationships for SQL-family backends

use super::schema::{ExternalTableRef, ReferentialConstraint, TableSchema};
use crate::error::{Error, Result};
use crate::transport::Logger;
use crate::types::JsonValue;
use serde::Deserialize;

/// One row of the foreign-key query result
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForeignKeyRow {
    #[serde(rename = "FK_Name")]
    pub constraint: String,
    #[serde(rename = "Parent_Table")]
    pub parent_table: String,
    #[serde(rename = "Column_Name")]
    pub column: String,
    #[serde(rename = "Referenced_Table")]
    pub referenced_table: String,
    #[serde(rename = "Referenced_Column")]
    pub referenced_column: String,
}

/// SQL listing the outgoing foreign keys of `table`
///
/// `table` is the bracketed wire name, e.g. `[dbo].[Orders]`.
pub fn foreign_key_query(table: &str) -> String {
    let table = table.replace('\'', "''");
    format!(
        "select fk.name as FK_Name, \
         '[' + sp.name + '].[' + tp.name + ']' as Parent_Table, \
         cp.name as Column_Name, \
         '[' + sr.name + '].[' + tr.name + ']' as Referenced_Table, \
         cr.name as Referenced_Column \
         from sys.foreign_keys fk \
         inner join sys.tables tp on fk.parent_object_id = tp.object_id \
         inner join sys.tables tr on fk.referenced_object_id = tr.object_id \
         inner join sys.schemas sp on tp.schema_id = sp.schema_id \
         inner join sys.schemas sr on tr.schema_id = sr.schema_id \
         inner join sys.foreign_key_columns fkc on fkc.constraint_object_id = fk.object_id \
         inner join sys.columns cp on fkc.parent_column_id = cp.column_id and fkc.parent_object_id = cp.object_id \
         inner join sys.columns cr on fkc.referenced_column_id = cr.column_id and fkc.referenced_object_id = cr.object_id \
         where '[' + sp.name + '].[' + tp.name + ']' = '{table}'"
    )
}

/// Parse the query response; no result set means no relationships
pub fn parse_foreign_keys(document: &JsonValue) -> Result<Vec<ForeignKeyRow>> {
    let Some(rows) = document.pointer("/ResultSets/Table1") else {
        return Ok(Vec::new());
    };
    serde_json::from_value(rows.clone()).map_err(|e| Error::malformed("relationships", e.to_string()))
}

/// Attach foreign keys to the schema's columns and relationship map
///
/// Rows for other tables or unknown columns are skipped.
pub fn apply_foreign_keys(schema: &mut TableSchema, rows: Vec<ForeignKeyRow>, logger: &dyn Logger) {
    for row in rows {
        if row.parent_table != schema.name {
            continue;
        }
        let Some(column) = schema.column_mut(&row.column) else {
            logger.warn(&format!(
                "foreign key '{}' names unknown column '{}' on '{}'",
                row.constraint, row.column, schema.name
            ));
            continue;
        };
        column.external_table = Some(ExternalTableRef {
            table: row.referenced_table.clone(),
            foreign_key: Some(row.referenced_column.clone()),
            constraint: Some(row.constraint.clone()),
        });

        schema
            .relationships
            .entry(row.referenced_table)
            .or_default()
            .push(ReferentialConstraint {
                constraint: row.constraint,
                column: row.column,
                referenced_column: row.referenced_column,
            });
    }
}
