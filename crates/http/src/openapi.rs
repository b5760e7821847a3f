//! OpenAPI document assembly from module fragments

use serde_json::{json, Value};

use shelf_kernel::ModuleRegistry;

/// Build the merged OpenAPI document for every registered module.
///
/// Module paths are prefixed with `/{module_name}`; a module's `/` becomes
/// the bare mount path.
pub fn document(registry: &ModuleRegistry) -> Value {
    let mut openapi_spec = json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Shelf API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "In-memory book records"
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
                    "details": { "type": "array", "items": { "type": "object" } },
                    "trace_id": { "type": "string" },
                    "timestamp": { "type": "string" }
                },
                "required": ["code", "message", "trace_id", "timestamp"]
            }
        },
        "required": ["error"]
    });

    openapi_spec["components"]["schemas"]["Message"] = json!({
        "type": "object",
        "properties": {
            "message": { "type": "string" }
        },
        "required": ["message"]
    });

    openapi_spec["paths"]["/"] = json!({
        "get": {
            "summary": "Greeting",
            "responses": {
                "200": {
                    "description": "Greeting message",
                    "content": {
                        "application/json": {
                            "schema": { "$ref": "#/components/schemas/Message" }
                        }
                    }
                }
            }
        }
    });

    openapi_spec["paths"]["/healthz"] = json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": {
                        "text/plain": {
                            "schema": { "type": "string" }
                        }
                    }
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
                openapi_spec["paths"][mounted_path(module.name(), path)] = path_item.clone();
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

/// Convert the JSON document into utoipa's model for Swagger UI, falling back
/// to a bare document if some fragment does not fit the model.
pub fn to_utoipa(spec: &Value) -> utoipa::openapi::OpenApi {
    serde_json::from_value(spec.clone()).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "OpenAPI document rejected by utoipa model");
        utoipa::openapi::OpenApiBuilder::new()
            .info(
                utoipa::openapi::InfoBuilder::new()
                    .title("Shelf API")
                    .version(env!("CARGO_PKG_VERSION"))
                    .build(),
            )
            .build()
    })
}

/// Absolute path for a module-relative route
pub fn mounted_path(module_name: &str, path: &str) -> String {
    if path == "/" || path.is_empty() {
        format!("/{}", module_name)
    } else {
        format!("/{}{}", module_name, path)
    }
}
