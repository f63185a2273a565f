//! The service's route table.

use std::sync::Arc;

use crate::http::handlers::{employees, files, inspect, timeoff};
use crate::http::state::AppState;
use crate::pipeline::{ErrorLogger, Timing};
use crate::routing::{RouteError, RouteTable};

/// Every dynamic route, wrapped in the error logger. The JSON employee API
/// is additionally timed.
pub fn build_routes(state: &AppState) -> Result<RouteTable, RouteError> {
    let sink = Arc::clone(&state.sink);

    RouteTable::builder()
        .layer(ErrorLogger::new(Arc::clone(&sink)))
        .get("/employees", files::employee_form)
        .post("/employees", timeoff::submit)
        .get("/employees/:username/*rest", inspect::path_params)
        .get("/request-object", inspect::request_object)
        .get("/query/*rest", inspect::query)
        .group("/api", |api| api.post("/timeoff", timeoff::submit))
        .get("/arsenal", files::arsenal)
        .get("/teerapat", files::attachment)
        .get("/stream", files::stream)
        .get("/employee-template", employees::list_page)
        .get("/employee-template/:id", employees::show_page)
        .post("/employee-template/:id", employees::submit_page)
        .group("/api/json-employees", |api| {
            api.layer(Timing::new(sink))
                .get("", employees::list_json)
                .get("/", employees::list_json)
                .get("/:id", employees::show_json)
                .post("/:id", employees::submit_json)
        })
        .get("/errors", inspect::errors)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteMatch;
    use axum::http::Method;

    fn table() -> RouteTable {
        build_routes(&AppState::for_tests()).unwrap()
    }

    #[test]
    fn test_all_routes_compile() {
        assert_eq!(table().len(), 17);
    }

    #[test]
    fn test_json_group_is_timed() {
        let table = table();
        let RouteMatch::Found(found) = table.find(&Method::GET, "/api/json-employees/962") else {
            panic!("expected a match");
        };
        assert_eq!(found.pattern, "/api/json-employees/:id");
        assert_eq!(found.chain.len(), 3);

        let RouteMatch::Found(found) = table.find(&Method::GET, "/errors") else {
            panic!("expected a match");
        };
        assert_eq!(found.chain.len(), 2);
    }

    #[test]
    fn test_wildcard_routes_bind_rest() {
        let table = table();
        let RouteMatch::Found(found) = table.find(&Method::GET, "/employees/alice/foo/bar") else {
            panic!("expected a match");
        };
        assert_eq!(found.params.get("username"), Some("alice"));
        assert_eq!(found.params.get("rest"), Some("/foo/bar"));
    }

    #[test]
    fn test_unknown_method_on_known_path() {
        match table().find(&Method::DELETE, "/employees") {
            RouteMatch::MethodNotAllowed(methods) => {
                assert_eq!(methods, vec![Method::GET, Method::POST]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
