/*!
Accretive OpenAPI document assembly.

[`OpenApiBuilder`] grows an [`OpenApiSpec`] through chained setters; nested
objects (paths, operations, parameters, bodies, responses) are configured
through closures receiving their own builder. Every schema-accepting method
compiles through one shared [`ComponentRegistry`], so identified schemas
referenced from several operations land in `components.schemas` exactly once.
Compilation failures are latched and surfaced by [`OpenApiBuilder::build`],
keeping the setters chainable.
*/

use indexmap::IndexMap;

use crate::ast::SchemaNode;
use crate::compiler::{drain_components, ComponentRegistry, SchemaCompiler};
use crate::error::{OpenApiError, OpenApiResult};
use crate::specification::{
    Components, ExternalDocumentation, Header, License, Method, OpenApiSpec, Operation, Parameter,
    ParameterLocation, PathItem, RequestBody, Response, SchemaFragment, SecurityScheme, Server,
    ServerVariable, Tag,
};

/// Media type used for request and response bodies.
pub const APPLICATION_JSON: &str = "application/json";

/// Compilation state shared by every builder of one document.
struct BuildContext {
    registry: ComponentRegistry,
    error: Option<OpenApiError>,
}

impl BuildContext {
    fn compile(&mut self, node: &SchemaNode) -> Option<SchemaFragment> {
        if self.error.is_some() {
            return None;
        }
        match SchemaCompiler::new(&mut self.registry).compile(node) {
            Ok(fragment) => Some(fragment),
            Err(error) => {
                self.error = Some(error);
                None
            }
        }
    }
}

/// Builder for a complete OpenAPI document.
pub struct OpenApiBuilder {
    spec: OpenApiSpec,
    ctx: BuildContext,
}

impl OpenApiBuilder {
    /// Start a document with the given title and version.
    pub fn new(title: &str, version: &str) -> Self {
        Self {
            spec: OpenApiSpec::new(title, version),
            ctx: BuildContext {
                registry: ComponentRegistry::new(),
                error: None,
            },
        }
    }

    /// Set the info section's description.
    pub fn description(mut self, description: &str) -> Self {
        self.spec.info.description = Some(description.to_string());
        self
    }

    /// Set the license in the info section.
    pub fn license(mut self, name: &str, url: Option<&str>) -> Self {
        self.spec.info.license = Some(License {
            name: name.to_string(),
            url: url.map(str::to_string),
        });
        self
    }

    /// Add a server.
    pub fn server(
        mut self,
        url: &str,
        configure: impl FnOnce(ServerBuilder) -> ServerBuilder,
    ) -> Self {
        let server = configure(ServerBuilder::new(url)).server;
        self.spec.servers.push(server);
        self
    }

    /// Add a global tag.
    pub fn global_tag(mut self, name: &str, description: Option<&str>) -> Self {
        self.spec.tags.push(Tag {
            name: name.to_string(),
            description: description.map(str::to_string),
            external_docs: None,
        });
        self
    }

    /// Set the document's external documentation.
    pub fn external_docs(mut self, url: &str, description: Option<&str>) -> Self {
        self.spec.external_docs = Some(ExternalDocumentation {
            url: url.to_string(),
            description: description.map(str::to_string),
        });
        self
    }

    /// Register a security scheme under `components.securitySchemes`.
    pub fn security_scheme(mut self, name: &str, scheme: SecurityScheme) -> Self {
        self.spec
            .components
            .get_or_insert_with(Components::default)
            .security_schemes
            .insert(name.to_string(), scheme);
        self
    }

    /// Add a global security requirement.
    pub fn security_requirement(mut self, scheme: &str, scopes: &[&str]) -> Self {
        let mut requirement = IndexMap::new();
        requirement.insert(
            scheme.to_string(),
            scopes.iter().map(|s| s.to_string()).collect(),
        );
        self.spec.security.push(requirement);
        self
    }

    /// Register a schema under `components.schemas` by name.
    pub fn component_schema(mut self, name: &str, node: &SchemaNode) -> Self {
        self.ctx.registry.register_if_absent(name, node);
        self
    }

    /// Add or extend a path. Repeated calls for the same path merge.
    pub fn path(
        mut self,
        path: &str,
        configure: impl FnOnce(PathItemBuilder) -> PathItemBuilder,
    ) -> Self {
        let slot = self.spec.paths.entry(path.to_string()).or_default();
        let item = std::mem::take(slot);
        *slot = configure(PathItemBuilder {
            item,
            ctx: &mut self.ctx,
        })
        .item;
        self
    }

    /// Finish the document: surface any latched compilation failure, then
    /// drain pending component registrations to fixpoint.
    pub fn build(mut self) -> OpenApiResult<OpenApiSpec> {
        if let Some(error) = self.ctx.error.take() {
            return Err(error);
        }

        let mut schemas = IndexMap::new();
        drain_components(&mut self.ctx.registry, &mut schemas)?;
        if !schemas.is_empty() {
            self.spec
                .components
                .get_or_insert_with(Components::default)
                .schemas = schemas;
        }
        Ok(self.spec)
    }
}

/// Builder for one server entry.
pub struct ServerBuilder {
    server: Server,
}

impl ServerBuilder {
    fn new(url: &str) -> Self {
        Self {
            server: Server {
                url: url.to_string(),
                description: None,
                variables: None,
            },
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.server.description = Some(description.to_string());
        self
    }

    /// Add a URL variable.
    pub fn variable(
        mut self,
        name: &str,
        default: &str,
        configure: impl FnOnce(VariableBuilder) -> VariableBuilder,
    ) -> Self {
        let variable = configure(VariableBuilder::new(default)).variable;
        self.server
            .variables
            .get_or_insert_with(IndexMap::new)
            .insert(name.to_string(), variable);
        self
    }
}

/// Builder for one server URL variable.
pub struct VariableBuilder {
    variable: ServerVariable,
}

impl VariableBuilder {
    fn new(default: &str) -> Self {
        Self {
            variable: ServerVariable {
                default: default.to_string(),
                enum_values: Vec::new(),
                description: None,
            },
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.variable.description = Some(description.to_string());
        self
    }

    /// Add allowed values.
    pub fn enum_values(mut self, values: &[&str]) -> Self {
        self.variable
            .enum_values
            .extend(values.iter().map(|v| v.to_string()));
        self
    }
}

/// Builder for one path item.
pub struct PathItemBuilder<'a> {
    item: PathItem,
    ctx: &'a mut BuildContext,
}

impl<'a> PathItemBuilder<'a> {
    pub fn summary(mut self, summary: &str) -> Self {
        self.item.summary = Some(summary.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.item.description = Some(description.to_string());
        self
    }

    /// Add a parameter shared by every operation on this path.
    pub fn parameter(
        mut self,
        name: &str,
        location: ParameterLocation,
        schema: &SchemaNode,
        configure: impl FnOnce(ParameterBuilder) -> ParameterBuilder,
    ) -> Self {
        if let Some(fragment) = self.ctx.compile(schema) {
            let parameter = configure(ParameterBuilder::new(name, location, fragment)).parameter;
            self.item.parameters.push(parameter);
        }
        self
    }

    /// Add or extend an operation. Repeated calls for the same method merge.
    pub fn operation(
        mut self,
        method: Method,
        configure: impl FnOnce(OperationBuilder) -> OperationBuilder,
    ) -> Self {
        let slot = self.item.operation_mut(method);
        let operation = slot.take().unwrap_or_default();
        *slot = Some(
            configure(OperationBuilder {
                operation,
                ctx: &mut *self.ctx,
            })
            .operation,
        );
        self
    }
}

/// Builder for one operation.
pub struct OperationBuilder<'a> {
    operation: Operation,
    ctx: &'a mut BuildContext,
}

impl<'a> OperationBuilder<'a> {
    pub fn summary(mut self, summary: &str) -> Self {
        self.operation.summary = Some(summary.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.operation.description = Some(description.to_string());
        self
    }

    pub fn operation_id(mut self, operation_id: &str) -> Self {
        self.operation.operation_id = Some(operation_id.to_string());
        self
    }

    /// Append grouping tags.
    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.operation
            .tags
            .extend(tags.iter().map(|t| t.to_string()));
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.operation.deprecated = Some(true);
        self
    }

    pub fn external_docs(mut self, url: &str, description: Option<&str>) -> Self {
        self.operation.external_docs = Some(ExternalDocumentation {
            url: url.to_string(),
            description: description.map(str::to_string),
        });
        self
    }

    /// Add a security requirement for this operation.
    pub fn security_requirement(mut self, scheme: &str, scopes: &[&str]) -> Self {
        let mut requirement = IndexMap::new();
        requirement.insert(
            scheme.to_string(),
            scopes.iter().map(|s| s.to_string()).collect(),
        );
        self.operation.security.push(requirement);
        self
    }

    /// Add an operation parameter.
    pub fn parameter(
        mut self,
        name: &str,
        location: ParameterLocation,
        schema: &SchemaNode,
        configure: impl FnOnce(ParameterBuilder) -> ParameterBuilder,
    ) -> Self {
        if let Some(fragment) = self.ctx.compile(schema) {
            let parameter = configure(ParameterBuilder::new(name, location, fragment)).parameter;
            self.operation.parameters.push(parameter);
        }
        self
    }

    /// Set the JSON request body schema, merging with an existing body.
    pub fn json_request(
        mut self,
        schema: &SchemaNode,
        configure: impl FnOnce(RequestBodyBuilder) -> RequestBodyBuilder,
    ) -> Self {
        if let Some(fragment) = self.ctx.compile(schema) {
            let mut body = self.operation.request_body.take().unwrap_or_default();
            body.content
                .entry(APPLICATION_JSON.to_string())
                .or_default()
                .schema = Some(fragment);
            self.operation.request_body =
                Some(configure(RequestBodyBuilder { body }).body);
        }
        self
    }

    /// Set the JSON response for a status code, merging with an existing
    /// entry. `schema` may be omitted for bodyless responses.
    pub fn json_response(
        mut self,
        status: u16,
        schema: Option<&SchemaNode>,
        description: &str,
        configure: impl FnOnce(ResponseBuilder) -> ResponseBuilder,
    ) -> Self {
        let fragment = match schema {
            Some(node) => match self.ctx.compile(node) {
                Some(fragment) => Some(fragment),
                None => return self,
            },
            None => None,
        };

        let slot = self
            .operation
            .responses
            .entry(status.to_string())
            .or_default();
        let mut response = std::mem::take(slot);
        response.description = description.to_string();
        if let Some(fragment) = fragment {
            response
                .content
                .entry(APPLICATION_JSON.to_string())
                .or_default()
                .schema = Some(fragment);
        }
        *slot = configure(ResponseBuilder {
            response,
            ctx: &mut *self.ctx,
        })
        .response;
        self
    }

    /// Add a 204 No-Content response.
    pub fn no_content_response(mut self, description: &str) -> Self {
        self.operation.responses.insert(
            "204".to_string(),
            Response {
                description: description.to_string(),
                ..Default::default()
            },
        );
        self
    }
}

/// Builder for one parameter.
pub struct ParameterBuilder {
    parameter: Parameter,
}

impl ParameterBuilder {
    fn new(name: &str, location: ParameterLocation, schema: SchemaFragment) -> Self {
        Self {
            parameter: Parameter {
                name: name.to_string(),
                location,
                schema,
                description: None,
                required: None,
                deprecated: None,
                allow_empty_value: None,
            },
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.parameter.description = Some(description.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.parameter.required = Some(true);
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.parameter.deprecated = Some(true);
        self
    }

    pub fn allow_empty_value(mut self) -> Self {
        self.parameter.allow_empty_value = Some(true);
        self
    }
}

/// Builder for one request body.
pub struct RequestBodyBuilder {
    body: RequestBody,
}

impl RequestBodyBuilder {
    pub fn description(mut self, description: &str) -> Self {
        self.body.description = Some(description.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.body.required = Some(true);
        self
    }
}

/// Builder for one response.
pub struct ResponseBuilder<'a> {
    response: Response,
    ctx: &'a mut BuildContext,
}

impl<'a> ResponseBuilder<'a> {
    /// Set response headers. Each header's description comes from its
    /// schema's own description annotation.
    pub fn response_headers(mut self, headers: &[(&str, &SchemaNode)]) -> Self {
        for (name, schema) in headers {
            if let Some(fragment) = self.ctx.compile(schema) {
                self.response.headers.insert(
                    name.to_string(),
                    Header {
                        schema: fragment,
                        description: schema.description().map(str::to_string),
                    },
                );
            }
        }
        self
    }
}
