//! OpenAPI document assembled from the module fragments.

use bookapi_kernel::ModuleRegistry;
use serde_json::{json, Value};

/// Public URL of a module-relative path
fn module_path(module_name: &str, path: &str) -> String {
    if path == "/" {
        format!("/api/{}", module_name)
    } else {
        format!("/api/{}{}", module_name, path)
    }
}

/// Build the full OpenAPI document for every registered module.
///
/// Module paths are prefixed with `/api/{module_name}`; schemas are merged
/// into a single `components.schemas` map next to the shared `ErrorResponse`.
pub fn merged_spec(registry: &ModuleRegistry) -> Value {
    let mut openapi_spec = json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Book Catalog API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Books, authors, categories, countries, reviewers and reviews"
        },
        "paths": {},
        "components": {
            "schemas": {}
        }
    });

    openapi_spec["components"]["schemas"]["ErrorResponse"] = json!({
        "type": "object",
        "properties": {
            "error": {
                "type": "object",
                "properties": {
                    "code": { "type": "string" },
                    "message": { "type": "string" },
                    "details": { "type": "array", "items": {} },
                    "trace_id": { "type": "string" },
                    "timestamp": { "type": "string" }
                },
                "required": ["code", "message", "trace_id", "timestamp"]
            }
        },
        "required": ["error"]
    });

    openapi_spec["paths"]["/healthz"] = json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": { "text/plain": { "schema": { "type": "string" } } }
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(module_spec) = module.openapi() else {
            continue;
        };

        if let Some(paths) = module_spec.get("paths").and_then(Value::as_object) {
            for (path, path_item) in paths {
                openapi_spec["paths"][module_path(module.name(), path)] = path_item.clone();
            }
        }

        if let Some(schemas) = module_spec
            .get("components")
            .and_then(|components| components.get("schemas"))
            .and_then(Value::as_object)
        {
            for (schema_name, schema_def) in schemas {
                openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
            }
        }
    }

    openapi_spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookapi_kernel::Module;
    use std::sync::Arc;

    struct ShelfModule;

    #[async_trait::async_trait]
    impl Module for ShelfModule {
        fn name(&self) -> &'static str {
            "shelves"
        }
    }

    #[test]
    fn root_path_maps_to_module_prefix() {
        assert_eq!(module_path("books", "/"), "/api/books");
        assert_eq!(module_path("books", "/{id}/rating"), "/api/books/{id}/rating");
    }

    #[test]
    fn empty_registry_still_documents_health() {
        let registry = ModuleRegistry::new();
        let spec = merged_spec(&registry);

        assert!(spec["paths"]["/healthz"]["get"].is_object());
        assert!(spec["components"]["schemas"]["ErrorResponse"].is_object());
    }

    #[test]
    fn modules_without_fragments_are_skipped() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(ShelfModule));

        let spec = merged_spec(&registry);
        assert_eq!(spec["paths"].as_object().unwrap().len(), 1);
    }
}
