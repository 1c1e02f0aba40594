//! OData query string compiler

use super::features::DelegationFeatures;
use super::request::{AggregateMethod, Aggregation, DelegationRequest};
use crate::error::{Error, Result};
use url::form_urlencoded::byte_serialize;

/// Compiles [`DelegationRequest`]s for a backend with a fixed feature set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelegationCompiler {
    supported: DelegationFeatures,
}

impl DelegationCompiler {
    /// Bits outside the defined feature set are never treated as supported
    pub fn new(supported: DelegationFeatures) -> Self {
        Self {
            supported: supported.known(),
        }
    }

    pub fn supported(&self) -> DelegationFeatures {
        self.supported
    }

    /// Fail if `request` uses any feature the backend did not declare
    pub fn check(&self, request: &DelegationRequest) -> Result<()> {
        let usage = request.usage();
        if usage.difference(self.supported).is_empty() {
            Ok(())
        } else {
            Err(Error::UnsupportedCapability {
                requested: usage.bits(),
                supported: self.supported.bits(),
            })
        }
    }

    /// Build the query string, without a leading `?`
    ///
    /// Clause order is `$select`, `$filter`, `$orderby`, `$top`, `$count`,
    /// `$apply`. Nothing is emitted for a request that uses no clause.
    pub fn compile(&self, request: &DelegationRequest) -> Result<String> {
        self.check(request)?;

        let mut clauses: Vec<String> = Vec::new();

        if let Some(columns) = request.columns.as_ref().filter(|c| !c.is_empty()) {
            let columns: Vec<String> = columns.iter().map(|c| encode(c)).collect();
            clauses.push(format!("$select={}", columns.join(",")));
        }

        if let Some(filter) = request.filter.as_deref().filter(|f| !f.is_empty()) {
            clauses.push(format!("$filter={}", encode(filter)));
        }

        if !request.order_by.is_empty() {
            let order: Vec<String> = request
                .order_by
                .iter()
                .map(|o| {
                    if o.is_descending() {
                        format!("{} desc", encode(&o.column))
                    } else {
                        encode(&o.column)
                    }
                })
                .collect();
            clauses.push(format!("$orderby={}", order.join(",")));
        }

        if let Some(top) = request.top {
            clauses.push(format!("$top={top}"));
        }

        if request.return_total_count {
            clauses.push("$count=true".to_string());
        }

        if let Some(apply) = apply_expression(&request.group_by, &request.aggregations) {
            clauses.push(format!("$apply={}", encode(&apply)));
        }

        Ok(clauses.join("&"))
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// `groupby((a,b),aggregate(...))`, `groupby((a,b))` or `aggregate(...)`
fn apply_expression(group_by: &[String], aggregations: &[Aggregation]) -> Option<String> {
    let aggregate = (!aggregations.is_empty()).then(|| {
        let parts: Vec<String> = aggregations.iter().map(aggregate_part).collect();
        format!("aggregate({})", parts.join(","))
    });

    match (group_by.is_empty(), aggregate) {
        (true, None) => None,
        (true, Some(aggregate)) => Some(aggregate),
        (false, None) => Some(format!("groupby(({}))", group_by.join(","))),
        (false, Some(aggregate)) => Some(format!("groupby(({}),{aggregate})", group_by.join(","))),
    }
}

fn aggregate_part(aggregation: &Aggregation) -> String {
    match aggregation.method {
        AggregateMethod::Count => format!("$count as {}", aggregation.alias),
        method => format!(
            "{} with {} as {}",
            aggregation.column,
            method.keyword(),
            aggregation.alias
        ),
    }
}
