//! Query delegation
//!
//! Turns a [`DelegationRequest`] into the OData query string the backend
//! runs, after checking that the backend declared every feature the request
//! uses. A request is either compiled whole or rejected; nothing is dropped
//! silently.
//!
//! ```
//! use cdp_tabular::delegation::{DelegationCompiler, DelegationFeature, DelegationRequest};
//!
//! let compiler = DelegationCompiler::new(DelegationFeature::Filter | DelegationFeature::Top);
//! let request = DelegationRequest::new().with_filter("score gt 5").with_top(10);
//! assert_eq!(compiler.compile(&request).unwrap(), "$filter=score+gt+5&$top=10");
//! ```

mod compiler;
mod features;
mod request;

pub use compiler::DelegationCompiler;
pub use features::{DelegationFeature, DelegationFeatures};
pub use request::{AggregateMethod, Aggregation, DelegationRequest, OrderBy, SortDirection};
