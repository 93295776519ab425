//! Request-side inputs: form content, route values, query parameters,
//! headers and claims.

mod adapter;
mod extract;
mod form;

pub use adapter::{BindingSources, RequestValues, RouteValue};
pub use extract::{ClaimLookup, HeaderLookup, Headers};
pub use form::{FormData, FormFile, NamedValues};
