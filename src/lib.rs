/*!
# refract

OpenAPI 3.0 document generation from typed schema descriptions.

A schema is described once as an immutable [`SchemaNode`] tree; from it this
crate derives two artifacts: an OpenAPI schema fragment (with identified
sub-schemas de-duplicated into `components.schemas` as `$ref` targets, which
also keeps recursive schemas finite) and a random example value conforming to
the same description. An accretive [`OpenApiBuilder`] assembles fragments into
a complete document.

## Usage

```rust
use refract::{Method, OpenApiBuilder, Property, SchemaNode};

let pet = SchemaNode::struct_of(vec![
    Property::required("name", SchemaNode::string()),
])
.with_identifier("Pet");

let spec = OpenApiBuilder::new("Pet store", "1.0.0")
    .path("/pet", |p| {
        p.operation(Method::Post, |op| {
            op.json_request(&pet, |r| r.required())
                .json_response(200, Some(&pet), "The created pet", |r| r)
        })
    })
    .build()
    .unwrap();

assert!(spec.to_json(true).unwrap().contains("#/components/schemas/Pet"));
```
*/

// Re-export main types
pub use crate::{
    annotations::{Annotations, RefinementKind},
    ast::{
        EnumMember, EnumValue, IndexSignature, LiteralValue, Property, SchemaNode, TemplateSpan,
        Thunk, TupleElement,
    },
    builder::{OpenApiBuilder, APPLICATION_JSON},
    compiler::{compile_schema, ComponentRegistry, SchemaCompiler},
    error::{ExampleError, OpenApiError, OpenApiResult},
    example::{generate_example, ExampleGenerator},
    specification::{Method, OpenApiSpec, ParameterLocation, SchemaFragment, SecurityScheme},
};

// Schema descriptions
pub mod annotations;
pub mod ast;

// Core compilation and generation
pub mod compiler;
pub mod example;

// Document model and assembly
pub mod builder;
pub mod specification;

// Error handling
pub mod error;
