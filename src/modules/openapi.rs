//! Builders for the OpenAPI fragments each module contributes.

use serde_json::{json, Value};

pub fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

pub fn array_of(name: &str) -> Value {
    json!({ "type": "array", "items": schema_ref(name) })
}

/// Integer path parameter
pub fn id_param(name: &str) -> Value {
    json!({
        "name": name,
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    })
}

/// Repeated integer query parameter, e.g. `?authId=1&authId=2`
pub fn id_list_param(name: &str, description: &str) -> Value {
    json!({
        "name": name,
        "in": "query",
        "required": true,
        "description": description,
        "style": "form",
        "explode": true,
        "schema": { "type": "array", "items": { "type": "integer", "format": "int64" } }
    })
}

pub fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

pub fn error_response(description: &str) -> Value {
    json_response(description, schema_ref("ErrorResponse"))
}

pub fn empty_response(description: &str) -> Value {
    json!({ "description": description })
}

pub fn json_body(schema: Value) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": schema } }
    })
}

/// Plain-text module health endpoint
pub fn health_operation(tag: &str) -> Value {
    json!({
        "get": {
            "summary": format!("{tag} health check"),
            "tags": [tag],
            "responses": {
                "200": {
                    "description": "OK",
                    "content": { "text/plain": { "schema": { "type": "string" } } }
                }
            }
        }
    })
}

/// Schema of the thin `{ "id": ... }` reference used in request bodies
pub fn entity_ref_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "id": { "type": "integer", "format": "int64" } },
        "required": ["id"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_items_reference_component() {
        assert_eq!(
            array_of("Book")["items"]["$ref"],
            "#/components/schemas/Book"
        );
    }
}
