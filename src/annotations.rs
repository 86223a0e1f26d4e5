use serde_json::Value;

use crate::specification::SchemaFragment;

/// Metadata attached to a schema node.
///
/// A closed record of the recognized annotation kinds rather than an open
/// key/value bag: the compiler and the example generator only ever read this
/// fixed set, and a wrongly-typed annotation becomes a construction-time
/// error instead of a runtime surprise.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    /// Stable name used for component extraction and `$ref` generation
    pub identifier: Option<String>,

    /// Human-readable description, merged into the compiled fragment
    pub description: Option<String>,

    /// Concrete example values; the generator picks one uniformly at random
    /// instead of descending into the node
    pub examples: Option<Vec<Value>>,

    /// Explicit OpenAPI schema fragment, the escape hatch for custom
    /// declarations the compiler cannot interpret structurally
    pub openapi: Option<SchemaFragment>,
}

impl Annotations {
    pub fn is_empty(&self) -> bool {
        self.identifier.is_none()
            && self.description.is_none()
            && self.examples.is_none()
            && self.openapi.is_none()
    }
}

/// Recognized refinement identities.
///
/// Each carries its machine-readable bound; the compiler translates them to
/// JSON-Schema vocabulary and the example generator derives clamping
/// constraints from them.
#[derive(Debug, Clone, PartialEq)]
pub enum RefinementKind {
    /// Integer-only numbers
    Int,
    /// Strictly greater than the bound
    GreaterThan(f64),
    /// Greater than or equal to the bound
    GreaterThanOrEqualTo(f64),
    /// Strictly less than the bound
    LessThan(f64),
    /// Less than or equal to the bound
    LessThanOrEqualTo(f64),
    /// Inclusive range
    Between(f64, f64),
    /// Minimum string length
    MinLength(usize),
    /// Maximum string length
    MaxLength(usize),
    /// Regular expression the string must match
    Pattern(String),
    /// Minimum array length
    MinItems(usize),
    /// Maximum array length
    MaxItems(usize),
    /// Exact array length
    ItemsCount(usize),
}

impl RefinementKind {
    /// Short name used in warnings and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            RefinementKind::Int => "int",
            RefinementKind::GreaterThan(_) => "greaterThan",
            RefinementKind::GreaterThanOrEqualTo(_) => "greaterThanOrEqualTo",
            RefinementKind::LessThan(_) => "lessThan",
            RefinementKind::LessThanOrEqualTo(_) => "lessThanOrEqualTo",
            RefinementKind::Between(_, _) => "between",
            RefinementKind::MinLength(_) => "minLength",
            RefinementKind::MaxLength(_) => "maxLength",
            RefinementKind::Pattern(_) => "pattern",
            RefinementKind::MinItems(_) => "minItems",
            RefinementKind::MaxItems(_) => "maxItems",
            RefinementKind::ItemsCount(_) => "itemsCount",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_annotations_are_empty() {
        assert!(Annotations::default().is_empty());
    }

    #[test]
    fn annotations_with_identifier_are_not_empty() {
        let annotations = Annotations {
            identifier: Some("Pet".to_string()),
            ..Default::default()
        };
        assert!(!annotations.is_empty());
    }
}
