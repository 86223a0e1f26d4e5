/*!
Random example generation.

[`ExampleGenerator`] walks a schema description and produces one concrete
[`Value`] conforming to it. Explicit examples annotations short-circuit the
structural walk; numeric and length refinements are threaded down as clamping
constraints. Unlike the compiler, the generator never degrades silently: a
schema it cannot produce a conforming value for is a typed [`ExampleError`].
*/

use rand::Rng;
use serde_json::{json, Map, Value};

use crate::annotations::RefinementKind;
use crate::ast::{number_to_json, NodeKind, SchemaNode};
use crate::error::ExampleError;

/// Numeric/length bounds accumulated while descending through refinements.
#[derive(Debug, Clone, Copy, Default)]
struct Constraint {
    min: Option<f64>,
    min_exclusive: bool,
    max: Option<f64>,
    max_exclusive: bool,
    integer: bool,
}

impl Constraint {
    /// Overlay `other` on top of `self`; bounds travel together with their
    /// exclusivity flag.
    fn merge(self, other: Constraint) -> Constraint {
        Constraint {
            min: other.min.or(self.min),
            min_exclusive: if other.min.is_some() {
                other.min_exclusive
            } else {
                self.min_exclusive
            },
            max: other.max.or(self.max),
            max_exclusive: if other.max.is_some() {
                other.max_exclusive
            } else {
                self.max_exclusive
            },
            integer: self.integer || other.integer,
        }
    }
}

/// Example generator with pluggable randomness.
///
/// Numbers are drawn from a sequential counter starting at 1 and then clamped
/// into the active constraint, which keeps generated documents readable and
/// reproducible; a seeded [`rand::rngs::StdRng`] makes every choice
/// deterministic.
pub struct ExampleGenerator<R: Rng> {
    rng: R,
    counter: i64,
}

impl<R: Rng> ExampleGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, counter: 1 }
    }

    /// Produce one example value for the schema.
    pub fn generate(&mut self, node: &SchemaNode) -> Result<Value, ExampleError> {
        self.go(node, Constraint::default())
    }

    fn next_integer(&mut self) -> i64 {
        let n = self.counter;
        self.counter += 1;
        n
    }

    fn choose<T: Clone>(&mut self, candidates: &[T]) -> Result<T, ExampleError> {
        if candidates.is_empty() {
            return Err(ExampleError::EmptyChoice);
        }
        let index = self.rng.gen_range(0..candidates.len());
        Ok(candidates[index].clone())
    }

    fn go(&mut self, node: &SchemaNode, constraint: Constraint) -> Result<Value, ExampleError> {
        if let Some(examples) = node.examples() {
            return self.choose(examples);
        }

        match &node.kind {
            NodeKind::Literal(value) => Ok(value.to_json()),

            NodeKind::Unknown => Ok(Value::Null),
            NodeKind::Any => self.choose(&[json!({}), json!("hello-world"), json!(69), Value::Null]),
            NodeKind::String => self.choose(&[json!("hello world"), json!("lorem ipsum")]),
            NodeKind::Object => self.choose(&[json!({"some": "object"})]),
            NodeKind::Boolean => self.choose(&[json!(true), json!(false)]),
            NodeKind::Number => {
                let n = self.next_integer();
                Ok(resolve_number(n as f64, &constraint))
            }
            NodeKind::BigInt => {
                let n = self.next_integer();
                Ok(Value::from(resolve_integer(n, &constraint)))
            }

            NodeKind::Tuple { elements, rest } => {
                let mut values = Vec::new();
                for element in elements {
                    values.push(self.go(&element.node, constraint)?);
                }
                if let Some(rest_node) = rest {
                    let minimum = constraint.min.map(|m| m as usize).unwrap_or(0);
                    let count = minimum.saturating_sub(elements.len()).max(1);
                    for _ in 0..count {
                        values.push(self.go(rest_node, constraint)?);
                    }
                }
                Ok(Value::Array(values))
            }

            NodeKind::Struct {
                properties,
                index_signatures,
            } => {
                for signature in index_signatures {
                    if !matches!(signature.key.kind, NodeKind::String) {
                        return Err(ExampleError::UnsupportedIndexSignature(
                            signature.key.kind_name(),
                        ));
                    }
                }
                let mut object = Map::new();
                for property in properties {
                    object.insert(property.name.clone(), self.go(&property.node, constraint)?);
                }
                Ok(Value::Object(object))
            }

            NodeKind::Union { members } => {
                if members.is_empty() {
                    return Err(ExampleError::EmptyChoice);
                }
                let index = self.rng.gen_range(0..members.len());
                self.go(&members[index], constraint)
            }

            NodeKind::Enum { members } => {
                if members.is_empty() {
                    return Err(ExampleError::EmptyChoice);
                }
                let index = self.rng.gen_range(0..members.len());
                Ok(members[index].value.to_json())
            }

            NodeKind::Refinement { inner, refinement } => {
                let derived = constraint_for(refinement)?;
                self.go(inner, constraint.merge(derived))
            }

            // Examples show decoded values, so generation follows the target
            // side while the compiler documents the source.
            NodeKind::Transformation { source: _, target } => self.go(target, constraint),

            NodeKind::Suspend { thunk } => self.go(&thunk.force(), constraint),

            NodeKind::TemplateLiteral { head, spans } => {
                let mut out = head.clone();
                for span in spans {
                    let value = self.go(&span.node, constraint)?;
                    out.push_str(&value_to_text(&value));
                    out.push_str(&span.literal);
                }
                Ok(Value::String(out))
            }

            NodeKind::Declaration { type_parameters } => {
                if node.identifier() == Some("Option") {
                    if let Some(parameter) = type_parameters.first() {
                        return if self.rng.gen_bool(0.5) {
                            Ok(Value::Null)
                        } else {
                            self.go(parameter, constraint)
                        };
                    }
                }
                Err(ExampleError::UnresolvedDeclaration)
            }

            NodeKind::Undefined
            | NodeKind::Void
            | NodeKind::Never
            | NodeKind::Symbol
            | NodeKind::UniqueSymbol => Err(ExampleError::UnsupportedKind(node.kind_name())),
        }
    }
}

/// Produce one example value using thread-local randomness.
pub fn generate_example(node: &SchemaNode) -> Result<Value, ExampleError> {
    ExampleGenerator::new(rand::thread_rng()).generate(node)
}

fn constraint_for(refinement: &RefinementKind) -> Result<Constraint, ExampleError> {
    let constraint = match refinement {
        RefinementKind::Int => Constraint {
            integer: true,
            ..Default::default()
        },
        RefinementKind::GreaterThan(v) => Constraint {
            min: Some(*v),
            min_exclusive: true,
            ..Default::default()
        },
        RefinementKind::GreaterThanOrEqualTo(v) => Constraint {
            min: Some(*v),
            ..Default::default()
        },
        RefinementKind::LessThan(v) => Constraint {
            max: Some(*v),
            max_exclusive: true,
            ..Default::default()
        },
        RefinementKind::LessThanOrEqualTo(v) => Constraint {
            max: Some(*v),
            ..Default::default()
        },
        RefinementKind::Between(min, max) => Constraint {
            min: Some(*min),
            max: Some(*max),
            ..Default::default()
        },
        RefinementKind::MinLength(n) | RefinementKind::MinItems(n) => Constraint {
            min: Some(*n as f64),
            ..Default::default()
        },
        RefinementKind::MaxLength(n) | RefinementKind::MaxItems(n) => Constraint {
            max: Some(*n as f64),
            ..Default::default()
        },
        RefinementKind::ItemsCount(n) => Constraint {
            min: Some(*n as f64),
            max: Some(*n as f64),
            ..Default::default()
        },
        RefinementKind::Pattern(_) => {
            return Err(ExampleError::UnsupportedRefinement(refinement.name()))
        }
    };
    Ok(constraint)
}

/// Clamp a generated number into the constraint: exclusive bounds are moved
/// one step inward, integer constraints round up.
fn resolve_number(value: f64, constraint: &Constraint) -> Value {
    let minimum = constraint
        .min
        .map(|m| if constraint.min_exclusive { m + 1.0 } else { m });
    let maximum = constraint
        .max
        .map(|m| if constraint.max_exclusive { m - 1.0 } else { m });

    let mut result = value;
    if let Some(min) = minimum {
        if result < min {
            result = min;
        }
    }
    if let Some(max) = maximum {
        if result > max {
            result = max;
        }
    }
    if constraint.integer && result.fract() != 0.0 {
        result = result.ceil();
    }
    number_to_json(result)
}

/// Integer variant of the clamping rule, used for arbitrary-precision
/// numbers.
fn resolve_integer(value: i64, constraint: &Constraint) -> i64 {
    let minimum = constraint
        .min
        .map(|m| m as i64 + i64::from(constraint.min_exclusive));
    let maximum = constraint
        .max
        .map(|m| m as i64 - i64::from(constraint.max_exclusive));

    let mut result = value;
    if let Some(min) = minimum {
        if result < min {
            result = min;
        }
    }
    if let Some(max) = maximum {
        if result > max {
            result = max;
        }
    }
    result
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
