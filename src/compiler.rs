/*!
Schema compilation.

[`SchemaCompiler`] walks a schema description and produces the matching
[`SchemaFragment`]. Nodes carrying an identifier are not expanded inline:
the compiler returns a `$ref` pointer and defers the expansion through a
[`ComponentRegistry`], which [`compile_schema`] drains to fixpoint after the
primary fragment is produced. Marking an identifier as seen at registration
time is what keeps directly and mutually recursive schemas finite: a schema
that runs into its own name mid-expansion short-circuits to a reference.
*/

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;

use crate::annotations::RefinementKind;
use crate::ast::{number_to_json, EnumValue, LiteralValue, NodeKind, Property, SchemaNode};
use crate::error::{OpenApiError, OpenApiResult};
use crate::specification::{
    ArrayFragment, ArrayItems, EnumFragment, ObjectFragment, OneOfFragment, SchemaFragment,
    SchemaType,
};

/// Bookkeeping for component extraction, scoped to one top-level compile or
/// one document build.
///
/// Registration is idempotent: an identifier enters the pending stack at most
/// once, no matter how many call sites reference it or whether its own
/// expansion references it again.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    seen: HashSet<String>,
    pending: Vec<(String, SchemaNode)>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `node` for expansion under `identifier` unless that name has
    /// already been registered.
    pub fn register_if_absent(&mut self, identifier: &str, node: &SchemaNode) {
        if self.seen.insert(identifier.to_string()) {
            self.pending.push((identifier.to_string(), node.clone()));
        }
    }

    /// Pop the most recently queued expansion task.
    pub fn pop_pending(&mut self) -> Option<(String, SchemaNode)> {
        self.pending.pop()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Compile a schema into its fragment plus the fully drained
/// `components.schemas` map.
///
/// A fresh registry is created per call; concurrent compilations never share
/// registration state.
pub fn compile_schema(
    node: &SchemaNode,
) -> OpenApiResult<(SchemaFragment, IndexMap<String, SchemaFragment>)> {
    let mut registry = ComponentRegistry::new();
    let fragment = SchemaCompiler::new(&mut registry).compile(node)?;
    let mut schemas = IndexMap::new();
    drain_components(&mut registry, &mut schemas)?;
    Ok((fragment, schemas))
}

/// Expand every pending registration into `schemas` until none remain.
///
/// The identifier annotation is stripped from each popped node before
/// compiling it, so the expansion itself is inline rather than an immediate
/// self-reference.
pub(crate) fn drain_components(
    registry: &mut ComponentRegistry,
    schemas: &mut IndexMap<String, SchemaFragment>,
) -> OpenApiResult<()> {
    while let Some((name, node)) = registry.pop_pending() {
        let fragment = SchemaCompiler::new(registry).compile(&node.without_identifier())?;
        schemas.insert(name, fragment);
    }
    Ok(())
}

/// Recursive-descent translator from schema nodes to OpenAPI fragments.
pub struct SchemaCompiler<'a> {
    registry: &'a mut ComponentRegistry,
}

impl<'a> SchemaCompiler<'a> {
    pub fn new(registry: &'a mut ComponentRegistry) -> Self {
        Self { registry }
    }

    /// Compile one node. The node's description annotation, when present,
    /// overrides the produced fragment's description.
    pub fn compile(&mut self, node: &SchemaNode) -> OpenApiResult<SchemaFragment> {
        let mut fragment = self.compile_kind(node)?;
        if let Some(description) = node.description() {
            fragment.set_description(description.to_string());
        }
        Ok(fragment)
    }

    /// When `node` carries an identifier, register it for deferred expansion
    /// and hand back a reference instead of expanding inline.
    fn try_reference(&mut self, node: &SchemaNode) -> Option<SchemaFragment> {
        let identifier = node.identifier()?;
        self.registry.register_if_absent(identifier, node);
        Some(SchemaFragment::reference(identifier))
    }

    fn compile_kind(&mut self, node: &SchemaNode) -> OpenApiResult<SchemaFragment> {
        let fragment = match &node.kind {
            NodeKind::Literal(value) => match value {
                LiteralValue::String(s) => SchemaFragment::Enum(EnumFragment::new(
                    SchemaType::String,
                    vec![Value::String(s.clone())],
                )),
                LiteralValue::Number(n) => SchemaFragment::Enum(EnumFragment::new(
                    SchemaType::Number,
                    vec![number_to_json(*n)],
                )),
                LiteralValue::Boolean(b) => SchemaFragment::Enum(EnumFragment::new(
                    SchemaType::Boolean,
                    vec![Value::Bool(*b)],
                )),
                LiteralValue::Integer(_) => SchemaFragment::integer(),
                LiteralValue::Null => SchemaFragment::null(),
            },

            NodeKind::Unknown | NodeKind::Any => SchemaFragment::empty(),
            NodeKind::String | NodeKind::TemplateLiteral { .. } => SchemaFragment::string(),
            NodeKind::Number => SchemaFragment::number(),
            NodeKind::Boolean => SchemaFragment::boolean(),
            NodeKind::Object => SchemaFragment::Object(ObjectFragment::default()),

            NodeKind::Tuple { elements, rest } => self.compile_tuple(elements, rest.as_deref())?,

            NodeKind::Struct {
                properties,
                index_signatures,
            } => {
                for signature in index_signatures {
                    if !matches!(signature.key.kind, NodeKind::String) {
                        return Err(OpenApiError::UnsupportedIndexSignature {
                            key_kind: signature.key.kind_name(),
                        });
                    }
                }
                if let Some(reference) = self.try_reference(node) {
                    return Ok(reference);
                }

                let mut output = ObjectFragment::default();
                for property in properties {
                    let (fragment, optional) = self.compile_property(property)?;
                    output.properties.insert(property.name.clone(), fragment);
                    if !optional {
                        output.required.push(property.name.clone());
                    }
                }

                if !index_signatures.is_empty() {
                    let mut compiled = index_signatures
                        .iter()
                        .map(|signature| self.compile(&signature.value))
                        .collect::<OpenApiResult<Vec<_>>>()?;
                    let additional = if compiled.len() == 1 {
                        compiled.pop()
                    } else {
                        Some(SchemaFragment::OneOf(OneOfFragment::new(compiled)))
                    };
                    output.additional_properties = additional.map(Box::new);
                }

                SchemaFragment::Object(output)
            }

            NodeKind::Union { members } => {
                if let Some(reference) = self.try_reference(node) {
                    return Ok(reference);
                }
                self.compile_union(members)?
            }

            NodeKind::Enum { members } => {
                if let Some(reference) = self.try_reference(node) {
                    return Ok(reference);
                }
                let values: Vec<EnumValue> =
                    members.iter().map(|member| member.value.clone()).collect();
                SchemaFragment::Enum(create_enum(&values, false, false)?)
            }

            NodeKind::Refinement { inner, refinement } => {
                let mut fragment = self.compile(inner)?;
                apply_refinement(&mut fragment, refinement);
                if node.identifier() == Some("Date") {
                    if let SchemaFragment::String(string) = &mut fragment {
                        string.format = Some("date-time".to_string());
                    }
                }
                fragment
            }

            // The source side is what travels over the wire, so the fragment
            // documents it rather than the decoded target.
            NodeKind::Transformation { source, target: _ } => {
                if matches!(source.kind, NodeKind::Struct { .. }) {
                    let identifier = node
                        .identifier()
                        .or_else(|| source.identifier())
                        .map(str::to_string);
                    if let Some(identifier) = identifier {
                        let registered = source.as_ref().clone().with_identifier(&identifier);
                        self.registry.register_if_absent(&identifier, &registered);
                        return Ok(SchemaFragment::reference(&identifier));
                    }
                }
                self.compile(source)?
            }

            NodeKind::Declaration { .. } => match &node.annotations.openapi {
                Some(fragment) => fragment.clone(),
                None => return Err(OpenApiError::MissingDeclarationSchema),
            },

            NodeKind::Suspend { thunk } => {
                let forced = thunk.force();
                let identifier = node
                    .identifier()
                    .or_else(|| forced.identifier())
                    .map(str::to_string);
                match identifier {
                    Some(identifier) => self.compile(&forced.with_identifier(&identifier))?,
                    None => {
                        tracing::warn!(
                            "suspended schema must carry an identifier, emitting the permissive empty fragment"
                        );
                        SchemaFragment::empty()
                    }
                }
            }

            NodeKind::Undefined
            | NodeKind::Void
            | NodeKind::Never
            | NodeKind::BigInt
            | NodeKind::Symbol
            | NodeKind::UniqueSymbol => {
                tracing::warn!(
                    kind = node.kind_name(),
                    "schema kind has no OpenAPI representation, emitting the permissive empty fragment"
                );
                SchemaFragment::empty()
            }
        };

        Ok(fragment)
    }

    fn compile_tuple(
        &mut self,
        elements: &[crate::ast::TupleElement],
        rest: Option<&SchemaNode>,
    ) -> OpenApiResult<SchemaFragment> {
        let mut compiled = elements
            .iter()
            .map(|element| self.compile(&element.node))
            .collect::<OpenApiResult<Vec<_>>>()?;

        let required = elements.iter().filter(|element| !element.optional).count();
        let min_items = (required > 0).then_some(required);
        let mut max_items = min_items;
        let mut items = match compiled.len() {
            0 => None,
            1 => compiled.pop().map(|fragment| ArrayItems::Single(Box::new(fragment))),
            _ => Some(ArrayItems::Tuple(compiled)),
        };
        let mut additional_items = None;

        if let Some(rest_node) = rest {
            let rest_fragment = self.compile(rest_node)?;
            match &items {
                Some(existing) => {
                    max_items = None;
                    let homogeneous =
                        matches!(existing, ArrayItems::Single(single) if **single == rest_fragment);
                    if !homogeneous {
                        additional_items = Some(Box::new(rest_fragment));
                    }
                }
                None => {
                    items = Some(ArrayItems::Single(Box::new(rest_fragment)));
                    max_items = None;
                }
            }
        }

        Ok(SchemaFragment::Array(ArrayFragment {
            min_items,
            max_items,
            items,
            additional_items,
            ..Default::default()
        }))
    }

    /// Compile a struct property, stripping an explicit `undefined` union
    /// member. A property whose type admits `undefined` is optional even
    /// without the optionality flag.
    fn compile_property(&mut self, property: &Property) -> OpenApiResult<(SchemaFragment, bool)> {
        if let NodeKind::Union { members } = &property.node.kind {
            if members
                .iter()
                .any(|member| matches!(member.kind, NodeKind::Undefined))
            {
                let remaining: Vec<SchemaNode> = members
                    .iter()
                    .filter(|member| !matches!(member.kind, NodeKind::Undefined))
                    .cloned()
                    .collect();
                let stripped = SchemaNode {
                    kind: NodeKind::Union { members: remaining },
                    annotations: property.node.annotations.clone(),
                };
                return Ok((self.compile(&stripped)?, true));
            }
        }
        Ok((self.compile(&property.node)?, property.optional))
    }

    fn compile_union(&mut self, members: &[SchemaNode]) -> OpenApiResult<SchemaFragment> {
        if members.is_empty() {
            return Err(OpenApiError::EmptyUnion);
        }

        let nullable = members.iter().any(is_null_literal);
        let non_null: Vec<&SchemaNode> = members
            .iter()
            .filter(|member| !is_null_literal(member))
            .collect();

        if non_null.is_empty() {
            return Ok(SchemaFragment::null());
        }

        if non_null.len() == 1 {
            let member = non_null[0];
            // A nullable wrapper around a native enumeration renders the
            // null inside the value list as well as via the nullable flag.
            if let NodeKind::Enum {
                members: enum_members,
            } = &member.kind
            {
                let values: Vec<EnumValue> = enum_members
                    .iter()
                    .map(|member| member.value.clone())
                    .collect();
                return Ok(SchemaFragment::Enum(create_enum(
                    &values, nullable, nullable,
                )?));
            }
            let mut fragment = self.compile(member)?;
            if nullable {
                fragment.set_nullable();
            }
            return Ok(fragment);
        }

        let literal_values: Option<Vec<LiteralValue>> = non_null
            .iter()
            .map(|member| match &member.kind {
                NodeKind::Literal(value) => Some(value.clone()),
                _ => None,
            })
            .collect();

        if let Some(values) = literal_values {
            let values = literal_enum_values(&values)?;
            return Ok(SchemaFragment::Enum(create_enum(&values, nullable, false)?));
        }

        let compiled = non_null
            .iter()
            .map(|member| self.compile(member))
            .collect::<OpenApiResult<Vec<_>>>()?;
        let mut one_of = OneOfFragment::new(compiled);
        one_of.nullable = nullable;
        Ok(SchemaFragment::OneOf(one_of))
    }
}

fn is_null_literal(node: &SchemaNode) -> bool {
    matches!(node.kind, NodeKind::Literal(LiteralValue::Null))
}

fn literal_enum_values(values: &[LiteralValue]) -> OpenApiResult<Vec<EnumValue>> {
    values
        .iter()
        .map(|value| match value {
            LiteralValue::String(s) => Ok(EnumValue::String(s.clone())),
            LiteralValue::Number(n) => Ok(EnumValue::Number(*n)),
            _ => Err(OpenApiError::MixedEnumValues),
        })
        .collect()
}

/// Build an enum fragment over string or number values. The JSON type comes
/// from the first value; heterogeneous value types are rejected.
fn create_enum(
    values: &[EnumValue],
    nullable: bool,
    append_null: bool,
) -> OpenApiResult<EnumFragment> {
    let first = values.first().ok_or(OpenApiError::EmptyEnum)?;
    let schema_type = match first {
        EnumValue::String(_) => SchemaType::String,
        EnumValue::Number(_) => SchemaType::Number,
    };
    let homogeneous = values
        .iter()
        .all(|value| std::mem::discriminant(value) == std::mem::discriminant(first));
    if !homogeneous {
        return Err(OpenApiError::MixedEnumValues);
    }

    let mut rendered: Vec<Value> = values.iter().map(EnumValue::to_json).collect();
    if append_null {
        rendered.push(Value::Null);
    }
    let mut fragment = EnumFragment::new(schema_type, rendered);
    fragment.nullable = nullable;
    Ok(fragment)
}

/// Translate a recognized refinement into JSON-Schema vocabulary on top of
/// the inner fragment. Constraints that do not fit the fragment's kind are
/// ignored.
fn apply_refinement(fragment: &mut SchemaFragment, refinement: &RefinementKind) {
    match (fragment, refinement) {
        (SchemaFragment::Number(f), RefinementKind::Int) => f.schema_type = SchemaType::Integer,
        (SchemaFragment::Number(f), RefinementKind::GreaterThan(v)) => {
            f.minimum = Some(*v);
            f.exclusive_minimum = true;
        }
        (SchemaFragment::Number(f), RefinementKind::GreaterThanOrEqualTo(v)) => {
            f.minimum = Some(*v);
        }
        (SchemaFragment::Number(f), RefinementKind::LessThan(v)) => {
            f.maximum = Some(*v);
            f.exclusive_maximum = true;
        }
        (SchemaFragment::Number(f), RefinementKind::LessThanOrEqualTo(v)) => {
            f.maximum = Some(*v);
        }
        (SchemaFragment::Number(f), RefinementKind::Between(min, max)) => {
            f.minimum = Some(*min);
            f.maximum = Some(*max);
        }
        (SchemaFragment::String(f), RefinementKind::MinLength(n)) => f.min_length = Some(*n),
        (SchemaFragment::String(f), RefinementKind::MaxLength(n)) => f.max_length = Some(*n),
        (SchemaFragment::String(f), RefinementKind::Pattern(pattern)) => {
            f.pattern = Some(pattern.clone());
        }
        (SchemaFragment::Array(f), RefinementKind::MinItems(n)) => f.min_items = Some(*n),
        (SchemaFragment::Array(f), RefinementKind::MaxItems(n)) => f.max_items = Some(*n),
        (SchemaFragment::Array(f), RefinementKind::ItemsCount(n)) => {
            f.min_items = Some(*n);
            f.max_items = Some(*n);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{EnumMember, TupleElement};
    use serde_json::json;

    fn compile(node: &SchemaNode) -> SchemaFragment {
        compile_schema(node).unwrap().0
    }

    fn compile_value(node: &SchemaNode) -> Value {
        serde_json::to_value(compile(node)).unwrap()
    }

    #[test]
    fn literals_compile_to_single_value_enums() {
        assert_eq!(
            compile_value(&SchemaNode::literal("a")),
            json!({"type": "string", "enum": ["a"]})
        );
        assert_eq!(
            compile_value(&SchemaNode::literal(1.0)),
            json!({"type": "number", "enum": [1]})
        );
        assert_eq!(
            compile_value(&SchemaNode::literal(true)),
            json!({"type": "boolean", "enum": [true]})
        );
        assert_eq!(compile_value(&SchemaNode::literal_null()), json!({"type": "null"}));
        assert_eq!(
            compile_value(&SchemaNode::literal_integer(10)),
            json!({"type": "integer"})
        );
    }

    #[test]
    fn primitive_keywords_compile_to_base_types() {
        assert_eq!(compile_value(&SchemaNode::string()), json!({"type": "string"}));
        assert_eq!(compile_value(&SchemaNode::number()), json!({"type": "number"}));
        assert_eq!(compile_value(&SchemaNode::boolean()), json!({"type": "boolean"}));
        assert_eq!(compile_value(&SchemaNode::object()), json!({"type": "object"}));
        assert_eq!(compile_value(&SchemaNode::unknown()), json!({}));
        assert_eq!(compile_value(&SchemaNode::any()), json!({}));
    }

    #[test]
    fn unsupported_kinds_degrade_to_the_empty_fragment() {
        assert_eq!(compile_value(&SchemaNode::never()), json!({}));
        assert_eq!(compile_value(&SchemaNode::void()), json!({}));
        assert_eq!(compile_value(&SchemaNode::symbol()), json!({}));
        assert_eq!(compile_value(&SchemaNode::bigint()), json!({}));
        assert_eq!(compile_value(&SchemaNode::undefined()), json!({}));
    }

    #[test]
    fn template_literals_compile_to_strings() {
        let node = SchemaNode::template_literal(
            "id-",
            vec![crate::ast::TemplateSpan::new(SchemaNode::number(), "")],
        );
        assert_eq!(compile_value(&node), json!({"type": "string"}));
    }

    #[test]
    fn two_element_tuples_pin_both_bounds() {
        let node = SchemaNode::tuple(vec![
            TupleElement::required(SchemaNode::string()),
            TupleElement::required(SchemaNode::number()),
        ]);
        assert_eq!(
            compile_value(&node),
            json!({
                "type": "array",
                "minItems": 2,
                "maxItems": 2,
                "items": [{"type": "string"}, {"type": "number"}]
            })
        );
    }

    #[test]
    fn single_element_tuples_use_a_bare_items_fragment() {
        let node = SchemaNode::tuple(vec![TupleElement::required(SchemaNode::string())]);
        assert_eq!(
            compile_value(&node),
            json!({
                "type": "array",
                "minItems": 1,
                "maxItems": 1,
                "items": {"type": "string"}
            })
        );
    }

    #[test]
    fn optional_tuple_elements_do_not_count_toward_the_bounds() {
        let node = SchemaNode::tuple(vec![
            TupleElement::required(SchemaNode::string()),
            TupleElement::optional(SchemaNode::number()),
        ]);
        assert_eq!(
            compile_value(&node),
            json!({
                "type": "array",
                "minItems": 1,
                "maxItems": 1,
                "items": [{"type": "string"}, {"type": "number"}]
            })
        );
    }

    #[test]
    fn rest_elements_drop_max_items_and_surface_additional_items() {
        let node = SchemaNode::tuple_with_rest(
            vec![
                TupleElement::required(SchemaNode::string()),
                TupleElement::required(SchemaNode::number()),
            ],
            SchemaNode::boolean(),
        );
        assert_eq!(
            compile_value(&node),
            json!({
                "type": "array",
                "minItems": 2,
                "items": [{"type": "string"}, {"type": "number"}],
                "additionalItems": {"type": "boolean"}
            })
        );
    }

    #[test]
    fn rest_elements_matching_the_items_fragment_stay_implicit() {
        let node = SchemaNode::tuple_with_rest(
            vec![TupleElement::required(SchemaNode::string())],
            SchemaNode::string(),
        );
        assert_eq!(
            compile_value(&node),
            json!({
                "type": "array",
                "minItems": 1,
                "items": {"type": "string"}
            })
        );
    }

    #[test]
    fn arrays_compile_to_unbounded_item_lists() {
        assert_eq!(
            compile_value(&SchemaNode::array(SchemaNode::string())),
            json!({"type": "array", "items": {"type": "string"}})
        );
    }

    #[test]
    fn structs_track_required_properties() {
        let node = SchemaNode::struct_of(vec![
            Property::required("id", SchemaNode::number()),
            Property::optional("nickname", SchemaNode::string()),
        ]);
        assert_eq!(
            compile_value(&node),
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "number"},
                    "nickname": {"type": "string"}
                },
                "required": ["id"]
            })
        );
    }

    #[test]
    fn union_with_undefined_is_equivalent_to_an_optional_property() {
        let with_union = SchemaNode::struct_of(vec![Property::required(
            "name",
            SchemaNode::union(vec![SchemaNode::string(), SchemaNode::undefined()]),
        )]);
        let with_flag =
            SchemaNode::struct_of(vec![Property::optional("name", SchemaNode::string())]);

        assert_eq!(compile(&with_union), compile(&with_flag));
        assert_eq!(
            compile_value(&with_union),
            json!({
                "type": "object",
                "properties": {"name": {"type": "string"}}
            })
        );
    }

    #[test]
    fn index_signatures_become_additional_properties() {
        let node = SchemaNode::record(SchemaNode::string(), SchemaNode::number());
        assert_eq!(
            compile_value(&node),
            json!({"type": "object", "additionalProperties": {"type": "number"}})
        );
    }

    #[test]
    fn several_index_signatures_become_a_one_of() {
        let node = SchemaNode::struct_with_index_signatures(
            Vec::new(),
            vec![
                crate::ast::IndexSignature::new(SchemaNode::string(), SchemaNode::number()),
                crate::ast::IndexSignature::new(SchemaNode::string(), SchemaNode::boolean()),
            ],
        );
        assert_eq!(
            compile_value(&node),
            json!({
                "type": "object",
                "additionalProperties": {
                    "oneOf": [{"type": "number"}, {"type": "boolean"}]
                }
            })
        );
    }

    #[test]
    fn non_string_index_signature_keys_are_rejected() {
        let node = SchemaNode::record(SchemaNode::number(), SchemaNode::string());
        assert!(matches!(
            compile_schema(&node),
            Err(OpenApiError::UnsupportedIndexSignature { key_kind: "number" })
        ));
    }

    #[test]
    fn literal_unions_collapse_to_enums() {
        let node = SchemaNode::union(vec![
            SchemaNode::literal("a"),
            SchemaNode::literal("b"),
            SchemaNode::literal("c"),
        ]);
        assert_eq!(
            compile_value(&node),
            json!({"type": "string", "enum": ["a", "b", "c"]})
        );
    }

    #[test]
    fn nullable_unions_merge_the_flag_into_the_member() {
        let node = SchemaNode::nullable(SchemaNode::string());
        assert_eq!(
            compile_value(&node),
            json!({"type": "string", "nullable": true})
        );
    }

    #[test]
    fn nullable_literal_unions_keep_null_out_of_the_value_list() {
        let node = SchemaNode::union(vec![
            SchemaNode::literal_null(),
            SchemaNode::literal("a"),
            SchemaNode::literal("b"),
        ]);
        assert_eq!(
            compile_value(&node),
            json!({"type": "string", "enum": ["a", "b"], "nullable": true})
        );
    }

    #[test]
    fn nullable_native_enums_append_null_to_the_value_list() {
        let node = SchemaNode::nullable(SchemaNode::enum_of(vec![
            EnumMember::new("A", "a"),
            EnumMember::new("B", "b"),
        ]));
        assert_eq!(
            compile_value(&node),
            json!({"type": "string", "enum": ["a", "b", null], "nullable": true})
        );
    }

    #[test]
    fn mixed_member_unions_compile_to_one_of() {
        let node = SchemaNode::union(vec![SchemaNode::string(), SchemaNode::number()]);
        assert_eq!(
            compile_value(&node),
            json!({"oneOf": [{"type": "string"}, {"type": "number"}]})
        );
    }

    #[test]
    fn unions_of_only_null_compile_to_the_null_type() {
        let node = SchemaNode::union(vec![SchemaNode::literal_null()]);
        assert_eq!(compile_value(&node), json!({"type": "null"}));
    }

    #[test]
    fn empty_unions_are_rejected() {
        assert!(matches!(
            compile_schema(&SchemaNode::union(Vec::new())),
            Err(OpenApiError::EmptyUnion)
        ));
    }

    #[test]
    fn native_enums_compile_to_value_lists() {
        let node = SchemaNode::enum_of(vec![
            EnumMember::new("Cat", "cat"),
            EnumMember::new("Dog", "dog"),
        ]);
        assert_eq!(
            compile_value(&node),
            json!({"type": "string", "enum": ["cat", "dog"]})
        );
    }

    #[test]
    fn mixed_enum_values_are_rejected() {
        let node = SchemaNode::enum_of(vec![
            EnumMember::new("Cat", "cat"),
            EnumMember::new("One", 1.0),
        ]);
        assert!(matches!(
            compile_schema(&node),
            Err(OpenApiError::MixedEnumValues)
        ));
    }

    #[test]
    fn empty_enums_are_rejected() {
        assert!(matches!(
            compile_schema(&SchemaNode::enum_of(Vec::new())),
            Err(OpenApiError::EmptyEnum)
        ));
    }

    #[test]
    fn boolean_literal_unions_are_rejected() {
        let node = SchemaNode::union(vec![SchemaNode::literal(true), SchemaNode::literal(false)]);
        assert!(matches!(
            compile_schema(&node),
            Err(OpenApiError::MixedEnumValues)
        ));
    }

    #[test]
    fn strict_bounds_translate_to_exclusive_flags() {
        let node = SchemaNode::number().refine(RefinementKind::GreaterThan(10.0));
        assert_eq!(
            compile_value(&node),
            json!({"type": "number", "minimum": 10, "exclusiveMinimum": true})
        );

        let node = SchemaNode::number().refine(RefinementKind::GreaterThanOrEqualTo(10.0));
        assert_eq!(
            compile_value(&node),
            json!({"type": "number", "minimum": 10})
        );
    }

    #[test]
    fn integer_refinements_change_the_number_type() {
        let node = SchemaNode::number()
            .refine(RefinementKind::Int)
            .refine(RefinementKind::Between(5.0, 10.0));
        assert_eq!(
            compile_value(&node),
            json!({"type": "integer", "minimum": 5, "maximum": 10})
        );
    }

    #[test]
    fn string_refinements_set_length_and_pattern() {
        let node = SchemaNode::string()
            .refine(RefinementKind::MinLength(1))
            .refine(RefinementKind::MaxLength(10))
            .refine(RefinementKind::Pattern("^[a-z]+$".to_string()));
        assert_eq!(
            compile_value(&node),
            json!({
                "type": "string",
                "minLength": 1,
                "maxLength": 10,
                "pattern": "^[a-z]+$"
            })
        );
    }

    #[test]
    fn date_refinements_emit_the_date_time_format() {
        let node = SchemaNode::string()
            .refine(RefinementKind::MinLength(1))
            .with_identifier("Date");
        // the identifier triggers the format, not component extraction
        assert_eq!(
            compile_value(&node),
            json!({"type": "string", "minLength": 1, "format": "date-time"})
        );
    }

    #[test]
    fn array_refinements_set_item_bounds() {
        let node = SchemaNode::array(SchemaNode::string()).refine(RefinementKind::MinItems(2));
        assert_eq!(
            compile_value(&node),
            json!({"type": "array", "items": {"type": "string"}, "minItems": 2})
        );
    }

    #[test]
    fn descriptions_merge_onto_the_fragment() {
        let node = SchemaNode::string().with_description("a pet name");
        assert_eq!(
            compile_value(&node),
            json!({"type": "string", "description": "a pet name"})
        );
    }

    #[test]
    fn transformations_compile_the_source_side() {
        let node = SchemaNode::transform(SchemaNode::string(), SchemaNode::number());
        assert_eq!(compile_value(&node), json!({"type": "string"}));
    }

    #[test]
    fn identified_transformations_of_structs_extract_references() {
        let source = SchemaNode::struct_of(vec![Property::required("value", SchemaNode::string())]);
        let node = SchemaNode::transform(source, SchemaNode::object()).with_identifier("Wire");

        let (fragment, schemas) = compile_schema(&node).unwrap();
        assert_eq!(
            serde_json::to_value(&fragment).unwrap(),
            json!({"$ref": "#/components/schemas/Wire"})
        );
        assert_eq!(
            serde_json::to_value(&schemas["Wire"]).unwrap(),
            json!({
                "type": "object",
                "properties": {"value": {"type": "string"}},
                "required": ["value"]
            })
        );
    }

    #[test]
    fn declarations_require_an_explicit_fragment() {
        let bare = SchemaNode::declaration(Vec::new());
        assert!(matches!(
            compile_schema(&bare),
            Err(OpenApiError::MissingDeclarationSchema)
        ));

        let annotated = SchemaNode::declaration(Vec::new()).with_openapi(SchemaFragment::string());
        assert_eq!(compile_value(&annotated), json!({"type": "string"}));
    }

    #[test]
    fn unidentified_suspensions_degrade_to_the_empty_fragment() {
        let node = SchemaNode::suspend(SchemaNode::string);
        assert_eq!(compile_value(&node), json!({}));
    }

    #[test]
    fn identified_structs_extract_into_components() {
        let node = SchemaNode::struct_of(vec![Property::required("value", SchemaNode::string())])
            .with_identifier("MyComponent");

        let (fragment, schemas) = compile_schema(&node).unwrap();
        assert_eq!(
            serde_json::to_value(&fragment).unwrap(),
            json!({"$ref": "#/components/schemas/MyComponent"})
        );
        assert_eq!(schemas.len(), 1);
        assert_eq!(
            serde_json::to_value(&schemas["MyComponent"]).unwrap(),
            json!({
                "type": "object",
                "properties": {"value": {"type": "string"}},
                "required": ["value"]
            })
        );
    }

    #[test]
    fn repeated_references_expand_exactly_once() {
        let shared = SchemaNode::struct_of(vec![Property::required("id", SchemaNode::number())])
            .with_identifier("Shared");
        let node = SchemaNode::struct_of(vec![
            Property::required("first", shared.clone()),
            Property::required("second", shared),
        ]);

        let (fragment, schemas) = compile_schema(&node).unwrap();
        assert_eq!(schemas.len(), 1);
        let value = serde_json::to_value(&fragment).unwrap();
        assert_eq!(
            value["properties"]["first"],
            json!({"$ref": "#/components/schemas/Shared"})
        );
        assert_eq!(value["properties"]["first"], value["properties"]["second"]);
    }

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
    fn recursive_schemas_terminate_with_a_self_reference() {
        let (fragment, schemas) = compile_schema(&category()).unwrap();

        assert_eq!(
            serde_json::to_value(&fragment).unwrap(),
            json!({"$ref": "#/components/schemas/Category"})
        );
        assert_eq!(schemas.len(), 1);
        assert_eq!(
            serde_json::to_value(&schemas["Category"]).unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "categories": {
                        "type": "array",
                        "items": {"$ref": "#/components/schemas/Category"}
                    }
                },
                "required": ["name", "categories"]
            })
        );
    }

    #[test]
    fn compiling_twice_yields_identical_results() {
        let node = SchemaNode::struct_of(vec![
            Property::required(
                "pet",
                SchemaNode::struct_of(vec![Property::required("name", SchemaNode::string())])
                    .with_identifier("Pet"),
            ),
            Property::optional(
                "status",
                SchemaNode::union(vec![
                    SchemaNode::literal("available"),
                    SchemaNode::literal("sold"),
                ]),
            ),
        ]);

        let (first_fragment, first_schemas) = compile_schema(&node).unwrap();
        let (second_fragment, second_schemas) = compile_schema(&node).unwrap();
        assert_eq!(first_fragment, second_fragment);
        assert_eq!(first_schemas, second_schemas);
    }
}
