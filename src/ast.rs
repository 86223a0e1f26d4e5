/*!
Typed schema descriptions.

A schema is an immutable tree of [`SchemaNode`]s, each pairing a structural
[`NodeKind`] with an [`Annotations`] record. The compiler and the example
generator only read this tree; construction happens up front through the
builder methods on [`SchemaNode`].
*/

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::annotations::{Annotations, RefinementKind};
use crate::specification::SchemaFragment;

/// One node of a schema description.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Structural kind
    pub kind: NodeKind,
    /// Attached metadata
    pub annotations: Annotations,
}

/// Structural kinds of schema nodes.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A constant value
    Literal(LiteralValue),
    /// Any string
    String,
    /// Any number
    Number,
    /// Any boolean
    Boolean,
    /// Any object
    Object,
    /// Unknown value
    Unknown,
    /// Any value
    Any,
    /// The undefined value
    Undefined,
    /// No value
    Void,
    /// Uninhabited
    Never,
    /// Arbitrary-precision integer
    BigInt,
    /// Symbol value
    Symbol,
    /// A specific symbol value
    UniqueSymbol,
    /// String template with interpolated spans
    TemplateLiteral {
        head: String,
        spans: Vec<TemplateSpan>,
    },
    /// Fixed elements plus an optional variable-length tail
    Tuple {
        elements: Vec<TupleElement>,
        rest: Option<Box<SchemaNode>>,
    },
    /// Named properties plus index signatures
    Struct {
        properties: Vec<Property>,
        index_signatures: Vec<IndexSignature>,
    },
    /// One of several member types
    Union { members: Vec<SchemaNode> },
    /// Native enumeration of (label, value) pairs
    Enum { members: Vec<EnumMember> },
    /// Inner type narrowed by a recognized predicate
    Refinement {
        inner: Box<SchemaNode>,
        refinement: RefinementKind,
    },
    /// Two-sided codec; the source side is the wire representation
    Transformation {
        source: Box<SchemaNode>,
        target: Box<SchemaNode>,
    },
    /// Opaque custom type
    Declaration { type_parameters: Vec<SchemaNode> },
    /// Deferred node, used for recursive schemas
    Suspend { thunk: Thunk },
}

/// A literal constant.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    /// Arbitrary-precision integer literal
    Integer(i64),
    Null,
}

impl LiteralValue {
    /// Convert to a JSON value. Whole numbers render without a fractional
    /// part so that `1.0` becomes `1` in generated documents.
    pub fn to_json(&self) -> Value {
        match self {
            LiteralValue::String(s) => Value::String(s.clone()),
            LiteralValue::Number(n) => number_to_json(*n),
            LiteralValue::Boolean(b) => Value::Bool(*b),
            LiteralValue::Integer(i) => Value::from(*i),
            LiteralValue::Null => Value::Null,
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        LiteralValue::String(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        LiteralValue::String(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        LiteralValue::Number(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        LiteralValue::Boolean(value)
    }
}

/// A value of a native enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    String(String),
    Number(f64),
}

impl EnumValue {
    pub fn to_json(&self) -> Value {
        match self {
            EnumValue::String(s) => Value::String(s.clone()),
            EnumValue::Number(n) => number_to_json(*n),
        }
    }
}

impl From<&str> for EnumValue {
    fn from(value: &str) -> Self {
        EnumValue::String(value.to_string())
    }
}

impl From<f64> for EnumValue {
    fn from(value: f64) -> Self {
        EnumValue::Number(value)
    }
}

pub(crate) fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// A (label, value) pair of a native enumeration.
#[derive(Debug, Clone)]
pub struct EnumMember {
    pub label: String,
    pub value: EnumValue,
}

impl EnumMember {
    pub fn new(label: &str, value: impl Into<EnumValue>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

/// One fixed element of a tuple.
#[derive(Debug, Clone)]
pub struct TupleElement {
    pub node: SchemaNode,
    pub optional: bool,
}

impl TupleElement {
    pub fn required(node: SchemaNode) -> Self {
        Self {
            node,
            optional: false,
        }
    }

    pub fn optional(node: SchemaNode) -> Self {
        Self {
            node,
            optional: true,
        }
    }
}

/// One named property of a struct.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub node: SchemaNode,
    pub optional: bool,
}

impl Property {
    pub fn required(name: &str, node: SchemaNode) -> Self {
        Self {
            name: name.to_string(),
            node,
            optional: false,
        }
    }

    pub fn optional(name: &str, node: SchemaNode) -> Self {
        Self {
            name: name.to_string(),
            node,
            optional: true,
        }
    }
}

/// An index signature of a struct. The key type must be string-like for the
/// schema to compile.
#[derive(Debug, Clone)]
pub struct IndexSignature {
    pub key: Box<SchemaNode>,
    pub value: Box<SchemaNode>,
}

impl IndexSignature {
    pub fn new(key: SchemaNode, value: SchemaNode) -> Self {
        Self {
            key: Box::new(key),
            value: Box::new(value),
        }
    }
}

/// One interpolated span of a template literal: a sub-schema followed by
/// trailing literal text.
#[derive(Debug, Clone)]
pub struct TemplateSpan {
    pub node: SchemaNode,
    pub literal: String,
}

impl TemplateSpan {
    pub fn new(node: SchemaNode, literal: &str) -> Self {
        Self {
            node,
            literal: literal.to_string(),
        }
    }
}

/// A deferred schema node.
///
/// The wrapped closure is forced at most once per compile site; recursive
/// schemas stay finite because the component registry short-circuits repeated
/// expansions of the same identifier.
#[derive(Clone)]
pub struct Thunk(Arc<dyn Fn() -> SchemaNode + Send + Sync>);

impl Thunk {
    pub fn new(f: impl Fn() -> SchemaNode + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Evaluate the thunk, yielding the real node.
    pub fn force(&self) -> SchemaNode {
        (self.0)()
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Thunk(..)")
    }
}

impl SchemaNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            annotations: Annotations::default(),
        }
    }

    /// A literal constant.
    pub fn literal(value: impl Into<LiteralValue>) -> Self {
        Self::new(NodeKind::Literal(value.into()))
    }

    /// The null literal.
    pub fn literal_null() -> Self {
        Self::new(NodeKind::Literal(LiteralValue::Null))
    }

    /// An arbitrary-precision integer literal.
    pub fn literal_integer(value: i64) -> Self {
        Self::new(NodeKind::Literal(LiteralValue::Integer(value)))
    }

    pub fn string() -> Self {
        Self::new(NodeKind::String)
    }

    pub fn number() -> Self {
        Self::new(NodeKind::Number)
    }

    pub fn boolean() -> Self {
        Self::new(NodeKind::Boolean)
    }

    pub fn object() -> Self {
        Self::new(NodeKind::Object)
    }

    pub fn unknown() -> Self {
        Self::new(NodeKind::Unknown)
    }

    pub fn any() -> Self {
        Self::new(NodeKind::Any)
    }

    pub fn undefined() -> Self {
        Self::new(NodeKind::Undefined)
    }

    pub fn void() -> Self {
        Self::new(NodeKind::Void)
    }

    pub fn never() -> Self {
        Self::new(NodeKind::Never)
    }

    pub fn bigint() -> Self {
        Self::new(NodeKind::BigInt)
    }

    pub fn symbol() -> Self {
        Self::new(NodeKind::Symbol)
    }

    pub fn unique_symbol() -> Self {
        Self::new(NodeKind::UniqueSymbol)
    }

    /// A string template starting with `head`, followed by interpolated
    /// spans.
    pub fn template_literal(head: &str, spans: Vec<TemplateSpan>) -> Self {
        Self::new(NodeKind::TemplateLiteral {
            head: head.to_string(),
            spans,
        })
    }

    /// A tuple of fixed elements.
    pub fn tuple(elements: Vec<TupleElement>) -> Self {
        Self::new(NodeKind::Tuple {
            elements,
            rest: None,
        })
    }

    /// A tuple of fixed elements followed by a variable-length tail.
    pub fn tuple_with_rest(elements: Vec<TupleElement>, rest: SchemaNode) -> Self {
        Self::new(NodeKind::Tuple {
            elements,
            rest: Some(Box::new(rest)),
        })
    }

    /// A homogeneous array, modeled as a tuple with only a rest element.
    pub fn array(item: SchemaNode) -> Self {
        Self::tuple_with_rest(Vec::new(), item)
    }

    /// A struct of named properties.
    pub fn struct_of(properties: Vec<Property>) -> Self {
        Self::new(NodeKind::Struct {
            properties,
            index_signatures: Vec::new(),
        })
    }

    /// A string-keyed record, modeled as a struct with one index signature.
    pub fn record(key: SchemaNode, value: SchemaNode) -> Self {
        Self::new(NodeKind::Struct {
            properties: Vec::new(),
            index_signatures: vec![IndexSignature::new(key, value)],
        })
    }

    /// A struct with both named properties and index signatures.
    pub fn struct_with_index_signatures(
        properties: Vec<Property>,
        index_signatures: Vec<IndexSignature>,
    ) -> Self {
        Self::new(NodeKind::Struct {
            properties,
            index_signatures,
        })
    }

    /// A union of member types.
    pub fn union(members: Vec<SchemaNode>) -> Self {
        Self::new(NodeKind::Union { members })
    }

    /// Shorthand for `union(null, node)`.
    pub fn nullable(node: SchemaNode) -> Self {
        Self::union(vec![Self::literal_null(), node])
    }

    /// A native enumeration.
    pub fn enum_of(members: Vec<EnumMember>) -> Self {
        Self::new(NodeKind::Enum { members })
    }

    /// Narrow this node by a recognized refinement.
    pub fn refine(self, refinement: RefinementKind) -> Self {
        Self::new(NodeKind::Refinement {
            inner: Box::new(self),
            refinement,
        })
    }

    /// A two-sided codec between a wire-side `source` and a decoded `target`.
    pub fn transform(source: SchemaNode, target: SchemaNode) -> Self {
        Self::new(NodeKind::Transformation {
            source: Box::new(source),
            target: Box::new(target),
        })
    }

    /// An opaque custom type. Compiling one requires an explicit schema
    /// fragment attached via [`SchemaNode::with_openapi`].
    pub fn declaration(type_parameters: Vec<SchemaNode>) -> Self {
        Self::new(NodeKind::Declaration { type_parameters })
    }

    /// A deferred node, forced on demand. Recursive schemas must carry an
    /// identifier on the suspension or on the forced node.
    pub fn suspend(f: impl Fn() -> SchemaNode + Send + Sync + 'static) -> Self {
        Self::new(NodeKind::Suspend {
            thunk: Thunk::new(f),
        })
    }

    /// Attach an identifier annotation.
    pub fn with_identifier(mut self, identifier: &str) -> Self {
        self.annotations.identifier = Some(identifier.to_string());
        self
    }

    /// Attach a description annotation.
    pub fn with_description(mut self, description: &str) -> Self {
        self.annotations.description = Some(description.to_string());
        self
    }

    /// Attach an examples annotation.
    pub fn with_examples(mut self, examples: Vec<Value>) -> Self {
        self.annotations.examples = Some(examples);
        self
    }

    /// Attach an explicit OpenAPI schema fragment.
    pub fn with_openapi(mut self, fragment: SchemaFragment) -> Self {
        self.annotations.openapi = Some(fragment);
        self
    }

    /// A copy of this node with the identifier annotation removed.
    pub fn without_identifier(&self) -> Self {
        let mut node = self.clone();
        node.annotations.identifier = None;
        node
    }

    pub fn identifier(&self) -> Option<&str> {
        self.annotations.identifier.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.annotations.description.as_deref()
    }

    pub fn examples(&self) -> Option<&[Value]> {
        self.annotations.examples.as_deref()
    }

    /// Kind name used in warnings and error messages.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Literal(_) => "literal",
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::Boolean => "boolean",
            NodeKind::Object => "object",
            NodeKind::Unknown => "unknown",
            NodeKind::Any => "any",
            NodeKind::Undefined => "undefined",
            NodeKind::Void => "void",
            NodeKind::Never => "never",
            NodeKind::BigInt => "bigint",
            NodeKind::Symbol => "symbol",
            NodeKind::UniqueSymbol => "uniqueSymbol",
            NodeKind::TemplateLiteral { .. } => "templateLiteral",
            NodeKind::Tuple { .. } => "tuple",
            NodeKind::Struct { .. } => "struct",
            NodeKind::Union { .. } => "union",
            NodeKind::Enum { .. } => "enum",
            NodeKind::Refinement { .. } => "refinement",
            NodeKind::Transformation { .. } => "transformation",
            NodeKind::Declaration { .. } => "declaration",
            NodeKind::Suspend { .. } => "suspend",
        }
    }
}
