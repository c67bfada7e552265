//! OpenAPI 3.0 description of the HTTP surface, served at `/api-docs`.
use axum::Json;
use serde_json::{json, Value};

pub(crate) async fn api_docs() -> Json<Value> {
    Json(openapi_document())
}

fn error_responses(codes: &[(&str, &str)]) -> Value {
    let mut responses = serde_json::Map::new();
    for (code, description) in codes {
        responses.insert(
            code.to_string(),
            json!({
                "description": description,
                "content": {
                    "application/json": { "schema": { "$ref": "#/components/schemas/Error" } }
                }
            }),
        );
    }
    Value::Object(responses)
}

fn merge(mut base: Value, extra: Value) -> Value {
    if let (Some(base), Value::Object(extra)) = (base.as_object_mut(), extra) {
        base.extend(extra);
    }
    base
}

fn path_param(name: &str, description: &str) -> Value {
    json!({
        "in": "path",
        "name": name,
        "required": true,
        "description": description,
        "schema": { "type": "integer" }
    })
}

fn articles_body() -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "required": ["articulos"],
                    "properties": {
                        "articulos": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/Articulo" }
                        }
                    }
                }
            }
        }
    })
}

/// Build the full document. Kept in sync with `api::router` by the router tests.
pub fn openapi_document() -> Value {
    let articulo = json!({ "$ref": "#/components/schemas/Articulo" });
    let lista = json!({ "$ref": "#/components/schemas/Lista" });
    let codart = path_param("codart", "Código del artículo");

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "API de Artículos",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "API REST para gestión de artículos y listas"
        },
        "tags": [
            { "name": "Artículos", "description": "Gestión de artículos" },
            { "name": "Listas", "description": "Gestión de listas de precios" }
        ],
        "paths": {
            "/api/articulos": {
                "get": {
                    "summary": "Obtener artículos paginados",
                    "tags": ["Artículos"],
                    "parameters": [
                        { "in": "query", "name": "page", "schema": { "type": "integer", "minimum": 1, "default": 1 } },
                        { "in": "query", "name": "limit", "schema": { "type": "integer", "minimum": 1, "default": 10 } }
                    ],
                    "responses": merge(json!({
                        "200": {
                            "description": "Página de artículos",
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": {
                                    "articulos": { "type": "array", "items": articulo },
                                    "total": { "type": "integer" },
                                    "pagina": { "type": "integer" },
                                    "totalPaginas": { "type": "integer" },
                                    "message": { "type": "string" }
                                }
                            } } }
                        },
                        "404": { "description": "No hay artículos en la página solicitada" }
                    }), error_responses(&[("400", "Parámetros inválidos"), ("500", "Error del servidor")]))
                },
                "post": {
                    "summary": "Crear un artículo",
                    "tags": ["Artículos"],
                    "requestBody": { "required": true, "content": { "application/json": { "schema": articulo } } },
                    "responses": merge(json!({
                        "201": { "description": "Artículo creado", "content": { "application/json": { "schema": articulo } } }
                    }), error_responses(&[("400", "Código ausente o duplicado"), ("500", "Error del servidor")]))
                }
            },
            "/api/articulos/{codart}": {
                "get": {
                    "summary": "Obtener un artículo por código",
                    "tags": ["Artículos"],
                    "parameters": [codart],
                    "responses": merge(json!({
                        "200": { "description": "Artículo encontrado", "content": { "application/json": { "schema": articulo } } }
                    }), error_responses(&[("404", "Artículo no encontrado"), ("500", "Error del servidor")]))
                },
                "put": {
                    "summary": "Actualizar un artículo",
                    "description": "Sobrescribe todos los campos no clave; los ausentes quedan en null",
                    "tags": ["Artículos"],
                    "parameters": [codart],
                    "requestBody": { "required": true, "content": { "application/json": { "schema": articulo } } },
                    "responses": merge(json!({
                        "200": { "description": "Artículo actualizado", "content": { "application/json": { "schema": articulo } } }
                    }), error_responses(&[("404", "Artículo no encontrado"), ("500", "Error del servidor")]))
                },
                "delete": {
                    "summary": "Eliminar un artículo",
                    "tags": ["Artículos"],
                    "parameters": [codart],
                    "responses": merge(json!({
                        "200": { "description": "Artículo eliminado" }
                    }), error_responses(&[("404", "Artículo no encontrado"), ("500", "Error del servidor")]))
                }
            },
            "/api/articulos/upsert": {
                "post": {
                    "summary": "UPSERT fila por fila",
                    "description": "Inserta o actualiza cada artículo por separado; los errores se informan por registro",
                    "tags": ["Artículos"],
                    "requestBody": articles_body(),
                    "responses": merge(json!({
                        "200": {
                            "description": "Procesamiento completado",
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": {
                                    "message": { "type": "string" },
                                    "inserted": { "type": "integer" },
                                    "updated": { "type": "integer" },
                                    "errors": { "type": "integer" },
                                    "total": { "type": "integer" },
                                    "detalles": {
                                        "type": "array",
                                        "items": {
                                            "type": "object",
                                            "properties": {
                                                "codart": { "type": "integer", "nullable": true },
                                                "status": { "type": "string", "enum": ["INSERTED", "UPDATED", "ERROR"] },
                                                "error": { "type": "string" }
                                            }
                                        }
                                    }
                                }
                            } } }
                        }
                    }), error_responses(&[("400", "Datos inválidos"), ("500", "Error del servidor")]))
                }
            },
            "/api/articulos/upsert/bulk": {
                "post": {
                    "summary": "UPSERT masivo atómico",
                    "description": "Una sola transacción; cualquier fallo revierte todo el lote",
                    "tags": ["Artículos"],
                    "requestBody": articles_body(),
                    "responses": merge(json!({
                        "200": {
                            "description": "Procesamiento masivo completado",
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": {
                                    "message": { "type": "string" },
                                    "total": { "type": "integer" }
                                }
                            } } }
                        }
                    }), error_responses(&[("400", "Datos inválidos"), ("500", "Error del servidor, lote revertido")]))
                }
            },
            "/api/listas": {
                "get": {
                    "summary": "Obtener todas las listas",
                    "tags": ["Listas"],
                    "responses": merge(json!({
                        "200": {
                            "description": "Listas de precios",
                            "content": { "application/json": { "schema": { "type": "array", "items": lista } } }
                        }
                    }), error_responses(&[("500", "Error del servidor")]))
                }
            },
            "/api/listas/{codlis}": {
                "get": {
                    "summary": "Obtener una lista por código",
                    "tags": ["Listas"],
                    "parameters": [path_param("codlis", "Código de la lista")],
                    "responses": merge(json!({
                        "200": { "description": "Lista encontrada", "content": { "application/json": { "schema": lista } } }
                    }), error_responses(&[("404", "Lista no encontrada"), ("500", "Error del servidor")]))
                }
            },
            "/health": {
                "get": {
                    "summary": "Verificar la conexión con la base de datos",
                    "responses": {
                        "200": { "description": "Base de datos conectada" },
                        "500": { "description": "Base de datos desconectada" }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Articulo": {
                    "type": "object",
                    "required": ["codart"],
                    "properties": {
                        "codart": { "type": "integer", "minimum": 1, "maximum": 99999, "description": "Código del artículo", "example": 1 },
                        "npm": { "type": "string", "maxLength": 200, "nullable": true, "description": "Nombre del artículo", "example": "LEVETIRACETAM 500 MG COMPRIMIDO CAJA X60" },
                        "stock": { "type": "number", "minimum": 0, "nullable": true, "description": "Stock disponible, redondeado a unidades", "example": 0 },
                        "pcosto": { "type": "number", "nullable": true, "description": "Precio de costo", "example": 1589.57 },
                        "pordif": { "type": "number", "nullable": true, "description": "Porcentaje de diferencia", "example": 0.0 }
                    }
                },
                "Lista": {
                    "type": "object",
                    "required": ["codlis"],
                    "properties": {
                        "codlis": { "type": "integer", "description": "Código de la lista", "example": 1 },
                        "nomlis": { "type": "string", "nullable": true, "description": "Nombre de la lista", "example": "ENTIDADES PUBLICAS" },
                        "porlis": { "type": "number", "nullable": true, "description": "Porcentaje de la lista", "example": 45.0 }
                    }
                },
                "Error": {
                    "type": "object",
                    "properties": {
                        "error": { "type": "string", "description": "Mensaje de error" },
                        "details": { "type": "string", "description": "Detalle técnico (solo errores 500)" }
                    }
                }
            }
        }
    })
}
