//! Metadata filter grammar: the closed field/operator schema shared by the
//! translator and the search collaborator.
//!
//! A [`FilterExpression`] is the validated, normalized form of whatever JSON
//! the inference step produced. Construction via [`FilterExpression::from_value`]
//! enforces the grammar; malformed output is a translation error, never
//! silently repaired.

use std::collections::BTreeMap;

use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};

use crate::error::{AgentError, Result};

/// Metadata fields recognized by the schema, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterField {
    Author,
    Tags,
    PublishedYear,
    PublishedMonth,
    PublishedDay,
}

impl FilterField {
    /// Every schema field, in serialization order.
    pub const ALL: [FilterField; 5] = [
        FilterField::Author,
        FilterField::Tags,
        FilterField::PublishedYear,
        FilterField::PublishedMonth,
        FilterField::PublishedDay,
    ];

    /// Wire name used in filter JSON and stored metadata.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            FilterField::Author => "author",
            FilterField::Tags => "tags",
            FilterField::PublishedYear => "published_year",
            FilterField::PublishedMonth => "published_month",
            FilterField::PublishedDay => "published_day",
        }
    }

    /// Resolve a wire name back to a schema field.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        FilterField::ALL.into_iter().find(|f| f.name() == name)
    }

    fn is_date_part(self) -> bool {
        matches!(
            self,
            FilterField::PublishedYear | FilterField::PublishedMonth | FilterField::PublishedDay
        )
    }

    /// Whether `op` is permitted on this field.
    #[must_use]
    pub fn allows(self, op: FilterOperator) -> bool {
        match self {
            FilterField::Author => matches!(op, FilterOperator::Eq | FilterOperator::Ne),
            FilterField::Tags => matches!(op, FilterOperator::In | FilterOperator::Nin),
            _ => op.is_comparison(),
        }
    }

    /// Inclusive value bounds for integer date parts. Enforced on `$eq`/`$ne`
    /// only; range endpoints (`{"$gt": 0}`) may legitimately lie outside.
    fn value_bounds(self) -> Option<(i64, i64)> {
        match self {
            FilterField::PublishedMonth => Some((1, 12)),
            FilterField::PublishedDay => Some((1, 31)),
            _ => None,
        }
    }
}

/// Query operators recognized by the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
}

impl FilterOperator {
    /// Wire symbol, e.g. `$eq`.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            FilterOperator::Eq => "$eq",
            FilterOperator::Ne => "$ne",
            FilterOperator::Gt => "$gt",
            FilterOperator::Gte => "$gte",
            FilterOperator::Lt => "$lt",
            FilterOperator::Lte => "$lte",
            FilterOperator::In => "$in",
            FilterOperator::Nin => "$nin",
        }
    }

    /// Resolve a wire symbol back to an operator.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        const ALL: [FilterOperator; 8] = [
            FilterOperator::Eq,
            FilterOperator::Ne,
            FilterOperator::Gt,
            FilterOperator::Gte,
            FilterOperator::Lt,
            FilterOperator::Lte,
            FilterOperator::In,
            FilterOperator::Nin,
        ];
        ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// Scalar comparison operators (everything except `$in`/`$nin`).
    #[must_use]
    pub fn is_comparison(self) -> bool {
        !matches!(self, FilterOperator::In | FilterOperator::Nin)
    }
}

/// Operator + value bound to one field of a [`FilterExpression`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCondition {
    /// String-valued field (`author`).
    Text { op: FilterOperator, value: String },
    /// List-valued field (`tags`); values are always operator-wrapped.
    TagList {
        op: FilterOperator,
        values: Vec<String>,
    },
    /// Integer-valued field (`published_year/month/day`); always wrapped.
    Number { op: FilterOperator, value: i64 },
}

impl FieldCondition {
    fn operator(&self) -> FilterOperator {
        match self {
            FieldCondition::Text { op, .. }
            | FieldCondition::TagList { op, .. }
            | FieldCondition::Number { op, .. } => *op,
        }
    }
}

/// A validated metadata filter: field → condition, in schema order.
///
/// An empty expression means "match everything"; callers passing it to a
/// search collaborator must omit the filter argument entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    fields: BTreeMap<FilterField, FieldCondition>,
}

impl FilterExpression {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn get(&self, field: FilterField) -> Option<&FieldCondition> {
        self.fields.get(&field)
    }

    #[must_use]
    pub fn contains(&self, field: FilterField) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterField, &FieldCondition)> {
        self.fields.iter().map(|(field, cond)| (*field, cond))
    }

    /// Insert a condition, enforcing the per-field operator whitelist and the
    /// field/condition shape pairing.
    pub fn insert(&mut self, field: FilterField, condition: FieldCondition) -> Result<()> {
        let op = condition.operator();
        if !field.allows(op) {
            return Err(AgentError::translation(format!(
                "operator {} is not allowed on field `{}`",
                op.symbol(),
                field.name()
            )));
        }
        let shape_ok = match (&condition, field) {
            (FieldCondition::Text { .. }, FilterField::Author) => true,
            (FieldCondition::TagList { .. }, FilterField::Tags) => true,
            (FieldCondition::Number { .. }, f) => f.is_date_part(),
            _ => false,
        };
        if !shape_ok {
            return Err(AgentError::translation(format!(
                "condition shape does not match field `{}`",
                field.name()
            )));
        }
        if let (
            FieldCondition::Number {
                op: FilterOperator::Eq | FilterOperator::Ne,
                value,
            },
            Some((lo, hi)),
        ) = (&condition, field.value_bounds())
        {
            if *value < lo || *value > hi {
                return Err(AgentError::translation(format!(
                    "value {value} out of range {lo}-{hi} for field `{}`",
                    field.name()
                )));
            }
        }
        self.fields.insert(field, condition);
        Ok(())
    }

    /// Validate and normalize raw filter JSON into a typed expression.
    ///
    /// Normalization contract: a bare scalar implies equality (`author`),
    /// bare strings/lists on `tags` become `$in`, and bare integers on date
    /// fields become `$eq`. `null` values and empty tag lists are treated as
    /// absent fields and dropped. Everything else that deviates from the
    /// schema is a translation error.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| AgentError::translation("filter must be a JSON object"))?;

        let mut expression = FilterExpression::new();
        for (key, raw) in object {
            let field = FilterField::from_name(key).ok_or_else(|| {
                AgentError::translation(format!("unrecognized filter field `{key}`"))
            })?;

            if raw.is_null() {
                tracing::debug!(field = key.as_str(), "dropping null filter field");
                continue;
            }

            let condition = match field {
                FilterField::Author => Some(author_condition(raw)?),
                FilterField::Tags => tags_condition(raw)?,
                _ => Some(date_condition(field, raw)?),
            };
            if let Some(condition) = condition {
                expression.insert(field, condition)?;
            } else {
                tracing::debug!(field = key.as_str(), "dropping empty filter field");
            }
        }
        Ok(expression)
    }

    /// Wire-shape JSON for this expression.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (field, condition) in self.iter() {
            map.insert(field.name().to_string(), condition_value(condition));
        }
        Value::Object(map)
    }
}

fn condition_value(condition: &FieldCondition) -> Value {
    match condition {
        // Author equality serializes as a bare scalar, matching the stored
        // metadata shape; every other condition is operator-wrapped.
        FieldCondition::Text {
            op: FilterOperator::Eq,
            value,
        } => Value::String(value.clone()),
        FieldCondition::Text { op, value } => json!({ op.symbol(): value }),
        FieldCondition::TagList { op, values } => json!({ op.symbol(): values }),
        FieldCondition::Number { op, value } => json!({ op.symbol(): value }),
    }
}

/// Unwrap a single-entry `{"$op": value}` object.
fn single_operator_entry(raw: &Value, field: FilterField) -> Result<(FilterOperator, &Value)> {
    let object = raw.as_object().ok_or_else(|| {
        AgentError::translation(format!(
            "field `{}` requires a scalar or an operator object",
            field.name()
        ))
    })?;
    if object.len() != 1 {
        return Err(AgentError::translation(format!(
            "operator object for `{}` must contain exactly one entry",
            field.name()
        )));
    }
    let (symbol, value) = object
        .iter()
        .next()
        .ok_or_else(|| AgentError::translation("empty operator object"))?;
    let op = FilterOperator::from_symbol(symbol).ok_or_else(|| {
        AgentError::translation(format!("unrecognized operator `{symbol}`"))
    })?;
    if !field.allows(op) {
        return Err(AgentError::translation(format!(
            "operator {} is not allowed on field `{}`",
            op.symbol(),
            field.name()
        )));
    }
    Ok((op, value))
}

fn author_condition(raw: &Value) -> Result<FieldCondition> {
    if let Some(name) = raw.as_str() {
        // Bare string implies equality.
        return Ok(FieldCondition::Text {
            op: FilterOperator::Eq,
            value: name.to_string(),
        });
    }
    let (op, value) = single_operator_entry(raw, FilterField::Author)?;
    let name = value
        .as_str()
        .ok_or_else(|| AgentError::translation("author operator value must be a string"))?;
    Ok(FieldCondition::Text {
        op,
        value: name.to_string(),
    })
}

fn string_list(value: &Value) -> Result<Vec<String>> {
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    AgentError::translation("tags values must be strings")
                })
            })
            .collect(),
        _ => Err(AgentError::translation(
            "tags value must be a string or a list of strings",
        )),
    }
}

/// `None` means the field was an empty placeholder and should be omitted.
fn tags_condition(raw: &Value) -> Result<Option<FieldCondition>> {
    let (op, values) = match raw {
        // Bare string or list normalizes to $in.
        Value::String(_) | Value::Array(_) => (FilterOperator::In, string_list(raw)?),
        _ => {
            let (op, value) = single_operator_entry(raw, FilterField::Tags)?;
            (op, string_list(value)?)
        }
    };
    if values.is_empty() {
        return Ok(None);
    }
    Ok(Some(FieldCondition::TagList { op, values }))
}

fn date_condition(field: FilterField, raw: &Value) -> Result<FieldCondition> {
    if let Some(n) = raw.as_i64() {
        // Bare integer normalizes to $eq.
        return Ok(FieldCondition::Number {
            op: FilterOperator::Eq,
            value: n,
        });
    }
    let (op, value) = single_operator_entry(raw, field)?;
    let n = value.as_i64().ok_or_else(|| {
        AgentError::translation(format!(
            "field `{}` operator value must be an integer",
            field.name()
        ))
    })?;
    Ok(FieldCondition::Number { op, value: n })
}

impl Serialize for FilterExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, condition) in self.iter() {
            map.serialize_entry(field.name(), &condition_value(condition))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FilterExpression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FilterExpression::from_value(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_scalars_are_normalized() {
        let raw = json!({
            "author": "Alice Zhang",
            "tags": "machine learning",
            "published_year": 2024
        });
        let filter = FilterExpression::from_value(&raw).expect("valid filter");
        assert_eq!(
            filter.get(FilterField::Tags),
            Some(&FieldCondition::TagList {
                op: FilterOperator::In,
                values: vec!["machine learning".to_string()],
            })
        );
        assert_eq!(
            filter.get(FilterField::PublishedYear),
            Some(&FieldCondition::Number {
                op: FilterOperator::Eq,
                value: 2024,
            })
        );
        assert_eq!(
            filter.to_value(),
            json!({
                "author": "Alice Zhang",
                "tags": {"$in": ["machine learning"]},
                "published_year": {"$eq": 2024}
            })
        );
    }

    #[test]
    fn bare_tag_list_wraps_in_in_operator() {
        let raw = json!({"tags": ["AI", "deep learning"]});
        let filter = FilterExpression::from_value(&raw).expect("valid filter");
        assert_eq!(
            filter.to_value(),
            json!({"tags": {"$in": ["AI", "deep learning"]}})
        );
    }

    #[test]
    fn unknown_field_is_rejected() {
        let raw = json!({"publisher": "Acme"});
        let err = FilterExpression::from_value(&raw).expect_err("must reject");
        assert!(matches!(err, AgentError::Translation { .. }));
    }

    #[test]
    fn operator_not_allowed_on_field_is_rejected() {
        let raw = json!({"author": {"$gt": "Alice"}});
        assert!(FilterExpression::from_value(&raw).is_err());
        let raw = json!({"tags": {"$eq": ["AI"]}});
        assert!(FilterExpression::from_value(&raw).is_err());
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        let raw = json!({"published_month": {"$eq": 13}});
        assert!(FilterExpression::from_value(&raw).is_err());
        let raw = json!({"published_day": 32});
        assert!(FilterExpression::from_value(&raw).is_err());
    }

    #[test]
    fn range_comparisons_may_use_out_of_range_endpoints() {
        let raw = json!({"published_month": {"$gt": 0}});
        let filter = FilterExpression::from_value(&raw).expect("valid filter");
        assert_eq!(
            filter.to_value(),
            json!({"published_month": {"$gt": 0}})
        );
        let raw = json!({"published_day": {"$lte": 45}});
        assert!(FilterExpression::from_value(&raw).is_ok());
    }

    #[test]
    fn null_and_empty_placeholders_are_dropped() {
        let raw = json!({"author": null, "tags": [], "published_year": 2023});
        let filter = FilterExpression::from_value(&raw).expect("valid filter");
        assert!(!filter.contains(FilterField::Author));
        assert!(!filter.contains(FilterField::Tags));
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn author_ne_stays_operator_wrapped() {
        let raw = json!({"author": {"$ne": "John Doe"}});
        let filter = FilterExpression::from_value(&raw).expect("valid filter");
        assert_eq!(filter.to_value(), json!({"author": {"$ne": "John Doe"}}));
    }

    #[test]
    fn multi_entry_operator_object_is_rejected() {
        let raw = json!({"published_year": {"$gte": 2020, "$lte": 2023}});
        assert!(FilterExpression::from_value(&raw).is_err());
    }

    #[test]
    fn serialization_orders_fields_by_schema() {
        let raw = json!({
            "published_month": 6,
            "author": "Emma Johnson",
            "tags": ["LLMs"]
        });
        let filter = FilterExpression::from_value(&raw).expect("valid filter");
        let text = serde_json::to_string(&filter).expect("serialize");
        let author = text.find("author").expect("author present");
        let tags = text.find("tags").expect("tags present");
        let month = text.find("published_month").expect("month present");
        assert!(author < tags && tags < month);
    }

    #[test]
    fn deserialize_revalidates() {
        let ok: FilterExpression =
            serde_json::from_str(r#"{"tags": {"$nin": ["spam"]}}"#).expect("valid");
        assert!(ok.contains(FilterField::Tags));
        let bad: std::result::Result<FilterExpression, _> =
            serde_json::from_str(r#"{"tags": {"$gt": 3}}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn empty_expression_is_match_all() {
        let filter = FilterExpression::from_value(&json!({})).expect("valid");
        assert!(filter.is_empty());
        assert_eq!(filter.to_value(), json!({}));
    }
}
