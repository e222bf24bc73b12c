//! Routing module
//!
//! Explicit dispatch table from (method, path pattern) to endpoint.

mod table;

pub use table::{Endpoint, MethodFilter, PathPattern, Route, RouteMatch, RouteTable};
