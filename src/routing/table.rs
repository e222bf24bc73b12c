//! Route table module
//!
//! Maps (method, path) pairs to endpoints. Routes are tried in order, the
//! first one whose path pattern matches decides the outcome.

use hyper::Method;

/// Request handlers the server knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// The single HTML page
    Index,
    /// Concatenated QWeb templates as JSON
    LoadQweb,
    /// Files under the static directory
    Static,
}

/// Path matching rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    /// Matches the prefix itself and anything below `prefix/`
    Prefix(String),
}

impl PathPattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => path == exact,
            Self::Prefix(prefix) => {
                let prefix = prefix.trim_end_matches('/');
                path.strip_prefix(prefix)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            }
        }
    }
}

/// Methods a route accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    Any,
    Only(Vec<Method>),
}

impl MethodFilter {
    fn accepts(&self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(methods) => methods.contains(method),
        }
    }

    /// Value for the `Allow` header, OPTIONS always included
    pub fn allow_header(&self) -> String {
        match self {
            Self::Any => "GET, HEAD, POST, PUT, PATCH, DELETE, OPTIONS".to_string(),
            Self::Only(methods) => methods
                .iter()
                .map(Method::as_str)
                .chain((!methods.contains(&Method::OPTIONS)).then_some("OPTIONS"))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    pub methods: MethodFilter,
    pub pattern: PathPattern,
    pub endpoint: Endpoint,
}

/// Outcome of a route lookup
#[derive(Debug, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    Matched(Endpoint),
    /// Path is routed but not for this method
    MethodNotAllowed(&'a MethodFilter),
    NotFound,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub const fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The server's routes, static files mounted on `static_prefix`
    pub fn standard(static_prefix: &str) -> Self {
        let read_only = || MethodFilter::Only(vec![Method::GET, Method::HEAD]);
        Self::new(vec![
            Route {
                methods: read_only(),
                pattern: PathPattern::Exact("/".to_string()),
                endpoint: Endpoint::Index,
            },
            Route {
                methods: MethodFilter::Any,
                pattern: PathPattern::Exact("/loadqweb".to_string()),
                endpoint: Endpoint::LoadQweb,
            },
            Route {
                methods: read_only(),
                pattern: PathPattern::Prefix(static_prefix.to_string()),
                endpoint: Endpoint::Static,
            },
        ])
    }

    pub fn lookup(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        let Some(route) = self.routes.iter().find(|r| r.pattern.matches(path)) else {
            return RouteMatch::NotFound;
        };

        if route.methods.accepts(method) {
            RouteMatch::Matched(route.endpoint)
        } else {
            RouteMatch::MethodNotAllowed(&route.methods)
        }
    }
}
