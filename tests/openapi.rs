//! Whole-document assembly tests.

use refract::{
    compile_schema, EnumMember, Method, OpenApiBuilder, ParameterLocation, Property, RefinementKind,
    SchemaNode, SecurityScheme,
};
use serde_json::json;

fn category() -> SchemaNode {
    SchemaNode::struct_of(vec![
        Property::required("name", SchemaNode::string()),
        Property::required(
            "categories",
            SchemaNode::array(SchemaNode::suspend(category).with_identifier("Category")),
        ),
    ])
    .with_identifier("Category")
}

#[test]
fn recursive_schemas_produce_a_finite_document() {
    let spec = OpenApiBuilder::new("test", "0.1")
        .path("/pet", |p| {
            p.operation(Method::Post, |op| {
                op.json_response(200, Some(&category()), "Test", |r| r)
            })
        })
        .build()
        .unwrap();

    assert_eq!(
        serde_json::to_value(&spec).unwrap(),
        json!({
            "openapi": "3.0.3",
            "info": {"title": "test", "version": "0.1"},
            "paths": {
                "/pet": {
                    "post": {
                        "responses": {
                            "200": {
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/Category"}
                                    }
                                },
                                "description": "Test"
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Category": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string"},
                            "categories": {
                                "type": "array",
                                "items": {"$ref": "#/components/schemas/Category"}
                            }
                        },
                        "required": ["name", "categories"]
                    }
                }
            }
        })
    );
}

#[test]
fn a_full_document_serializes_to_the_expected_shape() {
    let pet = SchemaNode::struct_of(vec![
        Property::required("name", SchemaNode::string().with_description("the pet's name")),
        Property::required(
            "status",
            SchemaNode::union(vec![
                SchemaNode::literal("available"),
                SchemaNode::literal("pending"),
                SchemaNode::literal("sold"),
            ]),
        ),
        Property::optional(
            "age",
            SchemaNode::number()
                .refine(RefinementKind::Int)
                .refine(RefinementKind::GreaterThanOrEqualTo(0.0)),
        ),
    ])
    .with_identifier("Pet");

    let spec = OpenApiBuilder::new("Pet store", "1.0.0")
        .description("Manage pets")
        .license("MIT", None)
        .server("https://api.example.com", |s| s.description("production"))
        .global_tag("pets", Some("Pet operations"))
        .security_scheme(
            "apiKey",
            SecurityScheme::ApiKey {
                name: "X-Api-Key".to_string(),
                location: "header".to_string(),
            },
        )
        .path("/pet/{id}", |p| {
            p.summary("One pet")
                .operation(Method::Get, |op| {
                    op.operation_id("getPet")
                        .tags(&["pets"])
                        .parameter("id", ParameterLocation::Path, &SchemaNode::number(), |p| {
                            p.required()
                        })
                        .json_response(200, Some(&pet), "The pet", |r| r)
                })
                .operation(Method::Delete, |op| op.no_content_response("Deleted"))
        })
        .path("/pet", |p| {
            p.operation(Method::Post, |op| {
                op.json_request(&pet, |r| r.required().description("The pet to create"))
                    .json_response(201, Some(&pet), "Created", |r| r)
            })
        })
        .build()
        .unwrap();

    let value = serde_json::to_value(&spec).unwrap();

    assert_eq!(value["info"]["description"], json!("Manage pets"));
    assert_eq!(value["servers"][0]["url"], json!("https://api.example.com"));
    assert_eq!(value["tags"], json!([{"name": "pets", "description": "Pet operations"}]));

    // both operations reference the single component definition
    assert_eq!(
        value["paths"]["/pet/{id}"]["get"]["responses"]["200"]["content"]["application/json"]
            ["schema"],
        json!({"$ref": "#/components/schemas/Pet"})
    );
    assert_eq!(
        value["paths"]["/pet"]["post"]["requestBody"]["content"]["application/json"]["schema"],
        json!({"$ref": "#/components/schemas/Pet"})
    );
    assert_eq!(value["components"]["schemas"].as_object().unwrap().len(), 1);
    assert_eq!(
        value["components"]["schemas"]["Pet"],
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "the pet's name"},
                "status": {"type": "string", "enum": ["available", "pending", "sold"]},
                "age": {"type": "integer", "minimum": 0}
            },
            "required": ["name", "status"]
        })
    );

    assert_eq!(
        value["paths"]["/pet/{id}"]["delete"]["responses"]["204"],
        json!({"description": "Deleted"})
    );
}

#[test]
fn standalone_compilation_matches_builder_output() {
    let status = SchemaNode::nullable(SchemaNode::enum_of(vec![
        EnumMember::new("On", "on"),
        EnumMember::new("Off", "off"),
    ]));

    let (fragment, schemas) = compile_schema(&status).unwrap();
    assert!(schemas.is_empty());
    assert_eq!(
        serde_json::to_value(&fragment).unwrap(),
        json!({"type": "string", "enum": ["on", "off", null], "nullable": true})
    );
}

#[test]
fn yaml_export_renders_the_document() {
    let spec = OpenApiBuilder::new("test", "0.1")
        .path("/pet", |p| {
            p.operation(Method::Get, |op| {
                op.json_response(200, Some(&SchemaNode::string()), "ok", |r| r)
            })
        })
        .build()
        .unwrap();

    let yaml = spec.to_yaml().unwrap();
    assert!(yaml.contains("openapi: 3.0.3"));
    assert!(yaml.contains("/pet:"));
    assert!(yaml.contains("type: string"));
}
