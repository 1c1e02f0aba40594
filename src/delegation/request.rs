//! Delegated query request

use super::features::{DelegationFeature, DelegationFeatures};
use serde::{Deserialize, Serialize};

/// Sort direction of one `$orderby` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// One `$orderby` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }

    pub fn is_descending(&self) -> bool {
        self.direction == SortDirection::Descending
    }
}

/// Aggregate function in an `$apply` clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateMethod {
    Sum,
    Min,
    Max,
    Average,
    /// Row count; the column is ignored
    Count,
    CountDistinct,
}

impl AggregateMethod {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            AggregateMethod::Sum => "sum",
            AggregateMethod::Min => "min",
            AggregateMethod::Max => "max",
            AggregateMethod::Average => "average",
            AggregateMethod::Count => "count",
            AggregateMethod::CountDistinct => "countdistinct",
        }
    }
}

/// One aggregated output column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub method: AggregateMethod,
    pub column: String,
    pub alias: String,
}

impl Aggregation {
    pub fn new(method: AggregateMethod, column: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            method,
            column: column.into(),
            alias: alias.into(),
        }
    }

    /// Row count under `alias`
    pub fn count(alias: impl Into<String>) -> Self {
        Self::new(AggregateMethod::Count, String::new(), alias)
    }
}

/// Operations a caller asks the backend to run
///
/// `features` holds bits the caller declares explicitly; the bits implied by
/// the populated fields are added by [`usage`](Self::usage).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationRequest {
    pub features: DelegationFeatures,
    /// `None` selects every column; `Some(vec![])` also emits no clause
    pub columns: Option<Vec<String>>,
    pub filter: Option<String>,
    pub order_by: Vec<OrderBy>,
    pub top: Option<u32>,
    pub return_total_count: bool,
    pub group_by: Vec<String>,
    pub aggregations: Vec<Aggregation>,
}

impl DelegationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare features explicitly, including ones no field implies
    #[must_use]
    pub fn with_features(mut self, features: impl Into<DelegationFeatures>) -> Self {
        self.features = self.features | features.into();
        self
    }

    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by.push(order_by);
        self
    }

    #[must_use]
    pub fn with_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    #[must_use]
    pub fn with_total_count(mut self) -> Self {
        self.return_total_count = true;
        self
    }

    #[must_use]
    pub fn with_group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregations.push(aggregation);
        self
    }

    /// Every feature this request actually uses
    pub fn usage(&self) -> DelegationFeatures {
        let mut used = self.features;
        if self.filter.is_some() {
            used.insert(DelegationFeature::Filter);
        }
        if self.top.is_some() {
            used.insert(DelegationFeature::Top);
        }
        if self.columns.is_some() {
            used.insert(DelegationFeature::Columns);
        }
        if !self.order_by.is_empty() {
            used.insert(DelegationFeature::Sort);
        }
        if self.return_total_count {
            used.insert(DelegationFeature::Count);
        }
        if !self.aggregations.is_empty() {
            used.insert(DelegationFeature::ApplyTopLevelAggregation);
        }
        if !self.group_by.is_empty() {
            used.insert(DelegationFeature::ApplyGroupBy);
        }
        used
    }
}
