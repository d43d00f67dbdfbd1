// Request routing onto the query service

use crate::catalog::metadata::{
    collection_context, entity_context, metadata_document, service_document, METADATA_PATH,
};
use crate::error::QueryError;
use crate::service::QueryService;
use crate::storage::StorageError;
use log::{debug, warn};
use serde::Serialize;

use super::http::{HttpRequest, HttpResponse, Method, StatusCode};

const SERVICE_ROOT: &str = "/odata";

/// Response envelope carrying the `@odata.context` annotation
#[derive(Serialize)]
struct ODataBody<'a, T: Serialize> {
    #[serde(rename = "@odata.context")]
    context: String,
    value: &'a T,
}

pub struct Router {
    service: QueryService,
}

impl Router {
    pub fn new(service: QueryService) -> Self {
        Self { service }
    }

    pub fn handle(&self, request: &HttpRequest) -> HttpResponse {
        debug!("{:?} {} {:?}", request.method, request.path, request.query);

        let path = request.path.trim_end_matches('/');
        if path == SERVICE_ROOT {
            return match request.method {
                Method::Get => {
                    HttpResponse::json(StatusCode::OK, &service_document(self.service.catalog()))
                }
                _ => method_not_allowed(request),
            };
        }
        if path == METADATA_PATH {
            return match request.method {
                Method::Get => HttpResponse::xml(metadata_document(self.service.catalog())),
                _ => method_not_allowed(request),
            };
        }

        let Some(entity_set) = path
            .strip_prefix(SERVICE_ROOT)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
        else {
            return HttpResponse::error(
                StatusCode::NOT_FOUND,
                "NotFound",
                &format!("No resource at {}", request.path),
            );
        };

        match request.method {
            Method::Get => self.query_collection(entity_set, request),
            Method::Post => self.create_entity(entity_set, request),
            Method::Other => method_not_allowed(request),
        }
    }

    fn query_collection(&self, entity_set: &str, request: &HttpRequest) -> HttpResponse {
        let result = self.service.run_query_with_expand(
            entity_set,
            request.query_param("$filter"),
            request.query_param("$select"),
            request.query_param("$expand"),
        );

        match result {
            Ok(records) => HttpResponse::json(
                StatusCode::OK,
                &ODataBody {
                    context: collection_context(entity_set),
                    value: &records,
                },
            ),
            Err(e) => query_error_response(&e),
        }
    }

    fn create_entity(&self, entity_set: &str, request: &HttpRequest) -> HttpResponse {
        let body: serde_json::Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(e) => {
                return HttpResponse::error(
                    StatusCode::BAD_REQUEST,
                    "InvalidEntity",
                    &format!("Body is not valid JSON: {}", e),
                )
            }
        };
        let Some(object) = body.as_object() else {
            return HttpResponse::error(
                StatusCode::BAD_REQUEST,
                "InvalidEntity",
                "Body must be a JSON object",
            );
        };

        match self.service.create_entity(entity_set, object) {
            Ok(record) => HttpResponse::json(
                StatusCode::CREATED,
                &ODataBody {
                    context: entity_context(entity_set),
                    value: &record,
                },
            ),
            Err(e) => query_error_response(&e),
        }
    }
}

/// HTTP status for a query failure
pub fn status_for(error: &QueryError) -> StatusCode {
    match error {
        QueryError::MalformedFilter { .. }
        | QueryError::UnknownField { .. }
        | QueryError::TypeMismatch { .. }
        | QueryError::InvalidEntity { .. } => StatusCode::BAD_REQUEST,
        QueryError::UnknownCollection { .. } => StatusCode::NOT_FOUND,
        QueryError::Storage(StorageError::KeySpaceExhausted { .. }) => StatusCode::CONFLICT,
        QueryError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn query_error_response(error: &QueryError) -> HttpResponse {
    let status = status_for(error);
    if status == StatusCode::SERVICE_UNAVAILABLE {
        warn!("Query failed: {}", error);
    } else {
        debug!("Query rejected: {}", error);
    }
    HttpResponse::error(status, error.kind(), &error.to_string())
}

fn method_not_allowed(request: &HttpRequest) -> HttpResponse {
    HttpResponse::error(
        StatusCode::METHOD_NOT_ALLOWED,
        "MethodNotAllowed",
        &format!("{:?} is not supported on {}", request.method, request.path),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::QueryConfig;
    use crate::storage::seed::demo_store;
    use bytes::Bytes;
    use std::sync::Arc;

    fn router() -> Router {
        Router::new(QueryService::new(
            Arc::new(Catalog::demo()),
            Arc::new(demo_store().unwrap()),
            QueryConfig::default(),
        ))
    }

    fn get(path: &str, query: &[(&str, &str)]) -> HttpRequest {
        HttpRequest {
            method: Method::Get,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: Bytes::new(),
        }
    }

    fn post(path: &str, body: &str) -> HttpRequest {
        HttpRequest {
            method: Method::Post,
            path: path.to_string(),
            query: Vec::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn json_body(response: &HttpResponse) -> serde_json::Value {
        serde_json::from_slice(&response.body).unwrap()
    }

    #[test]
    fn test_service_document() {
        let response = router().handle(&get("/odata/", &[]));
        assert_eq!(response.status, StatusCode::OK);
        let body = json_body(&response);
        assert_eq!(body["value"][0]["name"], "Products");
        assert_eq!(body["value"][1]["url"], "Brands");
    }

    #[test]
    fn test_metadata() {
        let response = router().handle(&get("/odata/$metadata", &[]));
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type, "application/xml");
        assert!(std::str::from_utf8(&response.body)
            .unwrap()
            .contains("EntitySet Name=\"Brands\""));
    }

    #[test]
    fn test_query_collection() {
        let response = router().handle(&get(
            "/odata/Products",
            &[("$filter", "Price lt 20"), ("$select", "Name,Price"), ("$expand", "Brand")],
        ));
        assert_eq!(response.status, StatusCode::OK);

        // Field order is kept on the wire
        let text = std::str::from_utf8(&response.body).unwrap();
        assert!(text.starts_with(
            r#"{"@odata.context":"/odata/$metadata#Products","value":[{"Name":"Mouse Optical","Price":15.0,"Brand":{"ID":3"#
        ));

        let body = json_body(&response);
        assert_eq!(body["value"].as_array().unwrap().len(), 1);
        assert_eq!(body["value"][0]["Brand"]["Name"], "SpeedyMouse");
    }

    #[test]
    fn test_query_errors_map_to_status() {
        let router = router();

        let response = router.handle(&get("/odata/Products", &[("$filter", "Price gt")]));
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&response)["error"]["code"], "MalformedFilter");

        let response = router.handle(&get(
            "/odata/Products",
            &[("$filter", "Price gt 10"), ("$select", "Name")],
        ));
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&response)["error"]["code"], "UnknownField");

        let response = router.handle(&get("/odata/Products", &[("$filter", "Name gt 'Apple'")]));
        assert_eq!(json_body(&response)["error"]["code"], "TypeMismatch");

        let response = router.handle(&get("/odata/Orders", &[]));
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(json_body(&response)["error"]["code"], "UnknownCollection");
    }

    #[test]
    fn test_unknown_routes_and_methods() {
        let router = router();
        assert_eq!(router.handle(&get("/", &[])).status, StatusCode::NOT_FOUND);
        assert_eq!(
            router.handle(&get("/odata/Products/1", &[])).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            router.handle(&post("/odata/$metadata", "{}")).status,
            StatusCode::METHOD_NOT_ALLOWED
        );

        let mut request = get("/odata/Products", &[]);
        request.method = Method::Other;
        assert_eq!(router.handle(&request).status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_create_entity() {
        let router = router();
        let response = router.handle(&post(
            "/odata/Products",
            r#"{"Name":"Cable","Description":"Cable USB-C","Price":5,"BrandID":99}"#,
        ));
        assert_eq!(response.status, StatusCode::CREATED);
        let body = json_body(&response);
        assert_eq!(body["@odata.context"], "/odata/$metadata#Products/$entity");
        assert_eq!(body["value"]["ID"], 7);
        assert_eq!(body["value"]["Price"], 5.0);

        let response = router.handle(&get(
            "/odata/Products",
            &[("$filter", "ID eq 7"), ("$expand", "Brand")],
        ));
        let body = json_body(&response);
        assert!(body["value"][0].get("Brand").is_none());
    }

    #[test]
    fn test_create_entity_bad_bodies() {
        let router = router();
        for body in ["not json", "[1,2]", r#"{"Colour":"red"}"#] {
            let response = router.handle(&post("/odata/Brands", body));
            assert_eq!(response.status, StatusCode::BAD_REQUEST, "body {}", body);
            assert_eq!(json_body(&response)["error"]["code"], "InvalidEntity");
        }
    }

    #[test]
    fn test_status_for_storage_error() {
        let error = QueryError::Storage(StorageError::Unavailable {
            collection: "Brands".to_string(),
        });
        assert_eq!(status_for(&error), StatusCode::SERVICE_UNAVAILABLE);

        let error = QueryError::Storage(StorageError::KeySpaceExhausted {
            collection: "Brands".to_string(),
        });
        assert_eq!(status_for(&error), StatusCode::CONFLICT);
    }

    #[test]
    fn test_create_entity_key_space_exhausted() {
        let router = router();
        let response = router.handle(&post(
            "/odata/Brands",
            &format!(r#"{{"ID":{},"Name":"Last","Country":"Nowhere"}}"#, i32::MAX),
        ));
        assert_eq!(response.status, StatusCode::CREATED);

        let response = router.handle(&post("/odata/Brands", r#"{"Name":"Next","Country":"Nowhere"}"#));
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(json_body(&response)["error"]["code"], "KeySpaceExhausted");
    }
}
