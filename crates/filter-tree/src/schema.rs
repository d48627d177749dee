//! Field schema supplied by the editing front end.
//!
//! The engine only uses the schema to pick defaults: the first field for a
//! new condition, and the first operator registered for a field's type. It
//! never checks that a condition's operator belongs to its field's type.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strsim::levenshtein;

use crate::ast::{ConditionOperator, OperatorClass};

/// Maximum Levenshtein distance to consider a field name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Operators offered for a type with no registered list.
const FALLBACK_OPERATORS: &[ConditionOperator] = &[ConditionOperator::Eq];

/// Declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    Select,
    Array,
}

impl FieldType {
    /// Returns the lowercase name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Select => "select",
            FieldType::Array => "array",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field offered by the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,

    /// Display label. Presentation only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Choices for select-like fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
}

impl FieldSchema {
    /// Creates a field with no label and no options.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: None,
            field_type,
            options: Vec::new(),
        }
    }

    /// Returns the label, falling back to the field name.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Ordered operators offered per field type.
pub type OperatorsByType = HashMap<FieldType, Vec<ConditionOperator>>;

/// Ordered field list plus the operators offered for each field type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub fields: Vec<FieldSchema>,

    #[serde(default)]
    pub operators_by_type: OperatorsByType,
}

impl Schema {
    /// Creates a schema from fields and operator lists.
    pub fn new(fields: Vec<FieldSchema>, operators_by_type: OperatorsByType) -> Self {
        Self {
            fields,
            operators_by_type,
        }
    }

    /// Returns the first field, used to seed new conditions.
    pub fn first_field(&self) -> Option<&FieldSchema> {
        self.fields.first()
    }

    /// Finds a field by exact name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the operators offered for a field type.
    ///
    /// Types without a registered list offer only `eq`.
    pub fn operators_for(&self, field_type: FieldType) -> &[ConditionOperator] {
        match self.operators_by_type.get(&field_type) {
            Some(ops) if !ops.is_empty() => ops,
            _ => FALLBACK_OPERATORS,
        }
    }

    /// Returns the default operator for a field type.
    pub fn default_operator(&self, field_type: FieldType) -> ConditionOperator {
        self.operators_for(field_type)
            .first()
            .cloned()
            .unwrap_or(ConditionOperator::Eq)
    }

    /// Finds the field name closest to `name`, if one is close enough.
    pub fn suggest_field(&self, name: &str) -> Option<String> {
        let query = name.to_lowercase();

        let (best, distance) = self
            .fields
            .iter()
            .map(|f| (f.name.as_str(), levenshtein(&query, &f.name.to_lowercase())))
            .min_by_key(|(_, d)| *d)?;

        if distance > 0 && distance <= MAX_SUGGESTION_DISTANCE {
            Some(best.to_string())
        } else {
            None
        }
    }
}

// ==================== Value shapes ====================

/// Kind of scalar an input expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Number,
    Date,
    Boolean,
    /// One of the field's options.
    Choice,
}

/// Shape of the value a condition expects for a field type and operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    /// The condition takes no value.
    None,
    /// A single scalar.
    Single(ValueKind),
    /// A `[lo, hi]` pair.
    Range(ValueKind),
    /// A list of scalars.
    List(ValueKind),
    /// The field type offers no input for this operator.
    Unsupported,
}

/// Looks up the value shape for a field type and operator.
///
/// Fields without a declared type take a single text value for every
/// operator that takes a value at all.
pub fn value_shape(field_type: Option<FieldType>, operator: &ConditionOperator) -> ValueShape {
    use FieldType as T;
    use OperatorClass as C;

    let class = operator.class();
    if class == C::Nullary {
        return ValueShape::None;
    }

    let Some(field_type) = field_type else {
        return ValueShape::Single(ValueKind::Text);
    };

    match (field_type, class) {
        (T::Number, C::Single) => ValueShape::Single(ValueKind::Number),
        (T::Number, C::Range) => ValueShape::Range(ValueKind::Number),
        (T::Number, C::List) => ValueShape::List(ValueKind::Number),

        (T::Date, C::Single) => ValueShape::Single(ValueKind::Date),
        (T::Date, C::Range) => ValueShape::Range(ValueKind::Date),
        (T::Date, C::List) => ValueShape::List(ValueKind::Date),

        (T::String, C::Single) => ValueShape::Single(ValueKind::Text),
        (T::String, C::Range) => ValueShape::Range(ValueKind::Text),
        (T::String, C::List) => ValueShape::List(ValueKind::Text),

        (T::Boolean, C::Single) => ValueShape::Single(ValueKind::Boolean),
        (T::Select, C::Single) => ValueShape::Single(ValueKind::Choice),
        (T::Array, C::Single) => ValueShape::List(ValueKind::Text),

        (T::Boolean | T::Select | T::Array, C::Range | C::List) => ValueShape::Unsupported,
        (_, C::Nullary) => ValueShape::None,
    }
}

impl ValueShape {
    /// Returns true if `value` fits this shape.
    ///
    /// This is a coarse structural check used to hint at editor input; the
    /// evaluator applies its own coercions regardless.
    pub fn accepts(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (ValueShape::None, value) => value.is_none(),
            (ValueShape::Unsupported, _) => false,
            (_, None) => false,
            (ValueShape::Single(kind), Some(v)) => kind.accepts(v),
            (ValueShape::Range(kind), Some(Value::Array(items))) => {
                items.len() == 2 && items.iter().all(|v| kind.accepts(v))
            }
            (ValueShape::List(kind), Some(Value::Array(items))) => {
                items.iter().all(|v| kind.accepts(v))
            }
            (ValueShape::Range(_) | ValueShape::List(_), Some(_)) => false,
        }
    }
}

impl ValueKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            ValueKind::Text | ValueKind::Date => value.is_string(),
            ValueKind::Number => value.is_number(),
            ValueKind::Boolean => value.is_boolean(),
            ValueKind::Choice => !value.is_array() && !value.is_object(),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Number => "number",
            ValueKind::Date => "date",
            ValueKind::Boolean => "boolean",
            ValueKind::Choice => "choice",
        }
    }
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueShape::None => f.write_str("no value"),
            ValueShape::Single(kind) => write!(f, "{}", kind.as_str()),
            ValueShape::Range(kind) => write!(f, "[{0}, {0}]", kind.as_str()),
            ValueShape::List(kind) => write!(f, "list of {}", kind.as_str()),
            ValueShape::Unsupported => f.write_str("unsupported"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_schema() -> Schema {
        let mut ops = OperatorsByType::new();
        ops.insert(
            FieldType::Number,
            vec![ConditionOperator::Gt, ConditionOperator::Lt, ConditionOperator::Between],
        );
        ops.insert(FieldType::String, vec![ConditionOperator::Contains]);
        Schema::new(
            vec![
                FieldSchema::new("age", FieldType::Number),
                FieldSchema::new("name", FieldType::String),
                FieldSchema::new("active", FieldType::Boolean),
            ],
            ops,
        )
    }

    #[test]
    fn test_first_field_and_lookup() {
        let schema = sample_schema();
        assert_eq!(schema.first_field().map(|f| f.name.as_str()), Some("age"));
        assert_eq!(
            schema.field("name").map(|f| f.field_type),
            Some(FieldType::String)
        );
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn test_default_operator_uses_first_registered() {
        let schema = sample_schema();
        assert_eq!(schema.default_operator(FieldType::Number), ConditionOperator::Gt);
        assert_eq!(
            schema.default_operator(FieldType::String),
            ConditionOperator::Contains
        );
    }

    #[test]
    fn test_default_operator_falls_back_to_eq() {
        let schema = sample_schema();
        assert_eq!(schema.default_operator(FieldType::Boolean), ConditionOperator::Eq);
        assert_eq!(schema.operators_for(FieldType::Date), &[ConditionOperator::Eq]);
    }

    #[test]
    fn test_suggest_field() {
        let schema = sample_schema();
        assert_eq!(schema.suggest_field("agee"), Some("age".to_string()));
        assert_eq!(schema.suggest_field("Nmae"), Some("name".to_string()));
        assert_eq!(schema.suggest_field("completely-different"), None);
        assert_eq!(schema.suggest_field("age"), None);
    }

    #[test]
    fn test_schema_deserializes_from_json() {
        let schema: Schema = serde_json::from_value(json!({
            "fields": [
                {"name": "age", "label": "Age", "type": "number"},
                {"name": "status", "type": "select", "options": ["open", "closed"]}
            ],
            "operators_by_type": {
                "number": ["gt", "lt"],
                "select": ["eq", "in"]
            }
        }))
        .unwrap();

        assert_eq!(schema.fields.len(), 2);
        assert_eq!(schema.fields[0].display_name(), "Age");
        assert_eq!(schema.fields[1].display_name(), "status");
        assert_eq!(schema.fields[1].options, vec![json!("open"), json!("closed")]);
        assert_eq!(schema.default_operator(FieldType::Select), ConditionOperator::Eq);
    }

    // ==================== Value shapes ====================

    #[test]
    fn test_value_shape_nullary_operators_take_nothing() {
        for field_type in [None, Some(FieldType::Number), Some(FieldType::Array)] {
            assert_eq!(value_shape(field_type, &ConditionOperator::IsNull), ValueShape::None);
            assert_eq!(
                value_shape(field_type, &ConditionOperator::IsNotNull),
                ValueShape::None
            );
        }
    }

    #[test]
    fn test_value_shape_by_type_and_class() {
        assert_eq!(
            value_shape(Some(FieldType::Number), &ConditionOperator::Between),
            ValueShape::Range(ValueKind::Number)
        );
        assert_eq!(
            value_shape(Some(FieldType::Date), &ConditionOperator::In),
            ValueShape::List(ValueKind::Date)
        );
        assert_eq!(
            value_shape(Some(FieldType::Date), &ConditionOperator::Before),
            ValueShape::Single(ValueKind::Date)
        );
        assert_eq!(
            value_shape(Some(FieldType::Select), &ConditionOperator::Eq),
            ValueShape::Single(ValueKind::Choice)
        );
        assert_eq!(
            value_shape(Some(FieldType::Array), &ConditionOperator::Contains),
            ValueShape::List(ValueKind::Text)
        );
    }

    #[test]
    fn test_value_shape_unsupported_combinations() {
        assert_eq!(
            value_shape(Some(FieldType::Boolean), &ConditionOperator::In),
            ValueShape::Unsupported
        );
        assert_eq!(
            value_shape(Some(FieldType::Select), &ConditionOperator::Between),
            ValueShape::Unsupported
        );
        assert_eq!(
            value_shape(Some(FieldType::Array), &ConditionOperator::Between),
            ValueShape::Unsupported
        );
    }

    #[test]
    fn test_value_shape_untyped_field_is_text() {
        assert_eq!(
            value_shape(None, &ConditionOperator::Between),
            ValueShape::Single(ValueKind::Text)
        );
    }

    #[test]
    fn test_value_shape_accepts() {
        let range = ValueShape::Range(ValueKind::Number);
        assert!(range.accepts(Some(&json!([18, 65]))));
        assert!(!range.accepts(Some(&json!([18]))));
        assert!(!range.accepts(Some(&json!(["a", "b"]))));
        assert!(!range.accepts(None));

        let list = ValueShape::List(ValueKind::Text);
        assert!(list.accepts(Some(&json!(["a", "b"]))));
        assert!(!list.accepts(Some(&json!("a"))));

        assert!(ValueShape::None.accepts(None));
        assert!(!ValueShape::None.accepts(Some(&json!(null))));
        assert!(!ValueShape::Unsupported.accepts(Some(&json!(1))));
    }

    #[test]
    fn test_value_shape_display() {
        assert_eq!(ValueShape::Range(ValueKind::Number).to_string(), "[number, number]");
        assert_eq!(ValueShape::List(ValueKind::Text).to_string(), "list of text");
        assert_eq!(ValueShape::None.to_string(), "no value");
    }
}
