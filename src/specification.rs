/*!
OpenAPI 3.0 document model.

The types here serialize bit-exact to the OpenAPI 3.0.3 subset this crate
targets. [`SchemaFragment`] is the compiler's output: a closed sum over the
schema shapes that subset can express, with optional keys omitted from the
serialized form.
*/

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::OpenApiResult;

// ---------------------------------------------------------------------------
// Schema fragments
// ---------------------------------------------------------------------------

/// JSON type names used by schema fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Serialize `Option<f64>` without a fractional part when the value is whole,
/// so integer bounds render as `10` rather than `10.0`.
fn serialize_bound<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(v) if v.fract() == 0.0 && v.is_finite() && v.abs() < i64::MAX as f64 => {
            serializer.serialize_some(&(*v as i64))
        }
        Some(v) => serializer.serialize_some(v),
        None => serializer.serialize_none(),
    }
}

/// An OpenAPI schema fragment.
///
/// Invariant: the [`SchemaFragment::Reference`] variant never carries schema
/// keys besides the reference itself and an optional description.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SchemaFragment {
    Reference(ReferenceFragment),
    Null(NullFragment),
    String(StringFragment),
    Number(NumberFragment),
    Boolean(BooleanFragment),
    Array(ArrayFragment),
    Enum(EnumFragment),
    OneOf(OneOfFragment),
    Object(ObjectFragment),
    Any(AnyFragment),
}

/// A `$ref` pointer into `components.schemas`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceFragment {
    #[serde(rename = "$ref")]
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NullFragment {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for NullFragment {
    fn default() -> Self {
        Self {
            schema_type: SchemaType::Null,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringFragment {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for StringFragment {
    fn default() -> Self {
        Self {
            schema_type: SchemaType::String,
            min_length: None,
            max_length: None,
            pattern: None,
            format: None,
            nullable: false,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberFragment {
    /// `number` or `integer`
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_bound"
    )]
    pub minimum: Option<f64>,
    #[serde(rename = "exclusiveMinimum", skip_serializing_if = "is_false")]
    pub exclusive_minimum: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_bound"
    )]
    pub maximum: Option<f64>,
    #[serde(rename = "exclusiveMaximum", skip_serializing_if = "is_false")]
    pub exclusive_maximum: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NumberFragment {
    pub fn number() -> Self {
        Self {
            schema_type: SchemaType::Number,
            minimum: None,
            exclusive_minimum: false,
            maximum: None,
            exclusive_maximum: false,
            nullable: false,
            description: None,
        }
    }

    pub fn integer() -> Self {
        Self {
            schema_type: SchemaType::Integer,
            ..Self::number()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BooleanFragment {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for BooleanFragment {
    fn default() -> Self {
        Self {
            schema_type: SchemaType::Boolean,
            nullable: false,
            description: None,
        }
    }
}

/// `items` of an array fragment: one homogeneous schema or a per-position
/// list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArrayItems {
    Single(Box<SchemaFragment>),
    Tuple(Vec<SchemaFragment>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayFragment {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<ArrayItems>,
    #[serde(rename = "additionalItems", skip_serializing_if = "Option::is_none")]
    pub additional_items: Option<Box<SchemaFragment>>,
    #[serde(skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for ArrayFragment {
    fn default() -> Self {
        Self {
            schema_type: SchemaType::Array,
            min_items: None,
            max_items: None,
            items: None,
            additional_items: None,
            nullable: false,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumFragment {
    /// `string`, `number` or `boolean`
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(rename = "enum")]
    pub values: Vec<Value>,
    #[serde(skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EnumFragment {
    pub fn new(schema_type: SchemaType, values: Vec<Value>) -> Self {
        Self {
            schema_type,
            values,
            nullable: false,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneOfFragment {
    #[serde(rename = "oneOf")]
    pub one_of: Vec<SchemaFragment>,
    #[serde(skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OneOfFragment {
    pub fn new(one_of: Vec<SchemaFragment>) -> Self {
        Self {
            one_of,
            nullable: false,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectFragment {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaFragment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Box<SchemaFragment>>,
    #[serde(skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for ObjectFragment {
    fn default() -> Self {
        Self {
            schema_type: SchemaType::Object,
            properties: IndexMap::new(),
            required: Vec::new(),
            additional_properties: None,
            nullable: false,
            description: None,
        }
    }
}

/// The permissive empty fragment, `{}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnyFragment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemaFragment {
    /// The permissive empty fragment.
    pub fn empty() -> Self {
        Self::Any(AnyFragment::default())
    }

    pub fn null() -> Self {
        Self::Null(NullFragment::default())
    }

    pub fn string() -> Self {
        Self::String(StringFragment::default())
    }

    pub fn number() -> Self {
        Self::Number(NumberFragment::number())
    }

    pub fn integer() -> Self {
        Self::Number(NumberFragment::integer())
    }

    pub fn boolean() -> Self {
        Self::Boolean(BooleanFragment::default())
    }

    /// A `$ref` pointer to a named component schema.
    pub fn reference(name: &str) -> Self {
        Self::Reference(ReferenceFragment {
            reference: format!("#/components/schemas/{name}"),
            description: None,
        })
    }

    /// Override the fragment's description.
    pub fn set_description(&mut self, description: String) {
        let slot = match self {
            SchemaFragment::Reference(f) => &mut f.description,
            SchemaFragment::Null(f) => &mut f.description,
            SchemaFragment::String(f) => &mut f.description,
            SchemaFragment::Number(f) => &mut f.description,
            SchemaFragment::Boolean(f) => &mut f.description,
            SchemaFragment::Array(f) => &mut f.description,
            SchemaFragment::Enum(f) => &mut f.description,
            SchemaFragment::OneOf(f) => &mut f.description,
            SchemaFragment::Object(f) => &mut f.description,
            SchemaFragment::Any(f) => &mut f.description,
        };
        *slot = Some(description);
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            SchemaFragment::Reference(f) => f.description.as_deref(),
            SchemaFragment::Null(f) => f.description.as_deref(),
            SchemaFragment::String(f) => f.description.as_deref(),
            SchemaFragment::Number(f) => f.description.as_deref(),
            SchemaFragment::Boolean(f) => f.description.as_deref(),
            SchemaFragment::Array(f) => f.description.as_deref(),
            SchemaFragment::Enum(f) => f.description.as_deref(),
            SchemaFragment::OneOf(f) => f.description.as_deref(),
            SchemaFragment::Object(f) => f.description.as_deref(),
            SchemaFragment::Any(f) => f.description.as_deref(),
        }
    }

    /// Mark the fragment nullable. References, the null type and the empty
    /// fragment cannot carry the flag; for those this is a no-op.
    pub fn set_nullable(&mut self) {
        match self {
            SchemaFragment::String(f) => f.nullable = true,
            SchemaFragment::Number(f) => f.nullable = true,
            SchemaFragment::Boolean(f) => f.nullable = true,
            SchemaFragment::Array(f) => f.nullable = true,
            SchemaFragment::Enum(f) => f.nullable = true,
            SchemaFragment::OneOf(f) => f.nullable = true,
            SchemaFragment::Object(f) => f.nullable = true,
            SchemaFragment::Reference(_) | SchemaFragment::Null(_) | SchemaFragment::Any(_) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

/// Complete OpenAPI 3.0 specification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenApiSpec {
    /// OpenAPI specification version
    pub openapi: String,

    /// API metadata
    pub info: Info,

    /// Server URLs
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,

    /// API paths and operations
    pub paths: IndexMap<String, PathItem>,

    /// Reusable components
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    /// Global security requirements
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,

    /// Tags for grouping operations
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,

    /// External documentation
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocumentation>,
}

impl OpenApiSpec {
    /// Create a new OpenAPI specification
    pub fn new(title: &str, version: &str) -> Self {
        Self {
            openapi: "3.0.3".to_string(),
            info: Info {
                title: title.to_string(),
                version: version.to_string(),
                description: None,
                license: None,
            },
            servers: Vec::new(),
            paths: IndexMap::new(),
            components: None,
            security: Vec::new(),
            tags: Vec::new(),
            external_docs: None,
        }
    }

    /// Export the specification as JSON
    pub fn to_json(&self, pretty: bool) -> OpenApiResult<String> {
        if pretty {
            Ok(serde_json::to_string_pretty(self)?)
        } else {
            Ok(serde_json::to_string(self)?)
        }
    }

    /// Export the specification as YAML
    pub fn to_yaml(&self) -> OpenApiResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// API metadata information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    /// API title
    pub title: String,

    /// API version
    pub version: String,

    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// License information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

/// License information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Server {
    /// Server URL
    pub url: String,

    /// Server description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Variable substitutions for the server URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<IndexMap<String, ServerVariable>>,
}

/// Server URL variable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerVariable {
    /// Default value
    pub default: String,

    /// Allowed values
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Tag for grouping operations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocumentation>,
}

/// External documentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalDocumentation {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// HTTP methods an operation can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

/// Path item containing the operations for one path
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PathItem {
    /// Optional summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,

    /// Common parameters for all operations on this path
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl PathItem {
    /// Mutable access to the operation slot for a method.
    pub fn operation_mut(&mut self, method: Method) -> &mut Option<Operation> {
        match method {
            Method::Get => &mut self.get,
            Method::Put => &mut self.put,
            Method::Post => &mut self.post,
            Method::Delete => &mut self.delete,
            Method::Options => &mut self.options,
            Method::Head => &mut self.head,
            Method::Patch => &mut self.patch,
            Method::Trace => &mut self.trace,
        }
    }
}

/// HTTP operation (GET, POST, ...)
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Operation {
    /// Tags for grouping
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Short summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Long description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// External documentation
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocumentation>,

    /// Unique operation ID
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    /// Parameters
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    /// Request body
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,

    /// Possible responses, keyed by status code
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Response>,

    /// Security requirements
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,

    /// Deprecated flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

/// Parameter location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

/// Parameter for operations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,

    /// Parameter location
    #[serde(rename = "in")]
    pub location: ParameterLocation,

    /// Schema defining the parameter
    pub schema: SchemaFragment,

    /// Parameter description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Required flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    /// Deprecated flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    /// Whether an empty value is allowed
    #[serde(rename = "allowEmptyValue", skip_serializing_if = "Option::is_none")]
    pub allow_empty_value: Option<bool>,
}

/// Request body specification
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RequestBody {
    /// Media type content
    pub content: IndexMap<String, MediaType>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Required flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

/// Response specification
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Response {
    /// Content
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,

    /// Headers
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Header>,

    /// Description
    pub description: String,
}

/// Response header specification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub schema: SchemaFragment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Media type specification
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MediaType {
    /// Schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaFragment>,

    /// Example value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Reusable components
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Components {
    /// Reusable schemas
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, SchemaFragment>,

    /// Security schemes
    #[serde(rename = "securitySchemes", skip_serializing_if = "IndexMap::is_empty")]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

/// Security scheme
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum SecurityScheme {
    #[serde(rename = "http")]
    Http {
        scheme: String,
        #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
        bearer_format: Option<String>,
    },
    #[serde(rename = "apiKey")]
    ApiKey {
        name: String,
        #[serde(rename = "in")]
        location: String,
    },
    #[serde(rename = "mutualTLS")]
    MutualTls,
    #[serde(rename = "oauth2")]
    OAuth2 { flows: OAuth2Flows },
    #[serde(rename = "openIdConnect")]
    OpenIdConnect {
        #[serde(rename = "openIdConnectUrl")]
        open_id_connect_url: String,
    },
}

/// OAuth2 flows
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OAuth2Flows {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OAuth2Flow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuth2Flow>,
    #[serde(rename = "clientCredentials", skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<OAuth2Flow>,
    #[serde(rename = "authorizationCode", skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<OAuth2Flow>,
}

/// OAuth2 flow
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OAuth2Flow {
    #[serde(rename = "authorizationUrl", skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(rename = "tokenUrl", skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(rename = "refreshUrl", skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
    pub scopes: IndexMap<String, String>,
}

/// Security requirement
pub type SecurityRequirement = IndexMap<String, Vec<String>>;
