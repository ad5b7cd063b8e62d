//! Numeric comparison grammar: clause recognition, field resolution,
//! and evaluation.
//!
//! A query may contain any number of clauses of the form
//! `field OP number` or `number OP field`; all retained clauses must
//! hold (logical AND). Clauses whose field token resolves to nothing
//! are dropped silently, and a query whose clauses all drop is
//! reported as containing no range expression so the engine can fall
//! back to fuzzy matching.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::record::{FieldValue, Record};

/// Tolerance for `=` / `!=` comparisons after float coercion.
const EQ_EPSILON: f64 = 1e-9;

static FIELD_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([\p{L}_][\p{L}\p{N}_]*)\s*(>=|<=|!=|>|<|=)\s*(-?\d+(?:\.\d+)?)")
        .expect("field-first clause pattern is valid")
});

static NUMBER_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(-?\d+(?:\.\d+)?)\s*(>=|<=|!=|>|<|=)\s*([\p{L}_][\p{L}\p{N}_]*)")
        .expect("number-first clause pattern is valid")
});

/// Comparison operator of a range clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `=`
    Eq,
    /// `!=`
    Ne,
}

impl ComparisonOp {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(ComparisonOp::Gt),
            "<" => Some(ComparisonOp::Lt),
            ">=" => Some(ComparisonOp::Ge),
            "<=" => Some(ComparisonOp::Le),
            "=" => Some(ComparisonOp::Eq),
            "!=" => Some(ComparisonOp::Ne),
            _ => None,
        }
    }

    /// Operator symbol, for diagnostics.
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Gt => ">",
            ComparisonOp::Lt => "<",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Le => "<=",
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "!=",
        }
    }

    /// Mirror operator used when the numeric literal is on the left:
    /// `25 < age` normalizes to `age > 25`.
    pub fn mirror(self) -> Self {
        match self {
            ComparisonOp::Gt => ComparisonOp::Lt,
            ComparisonOp::Lt => ComparisonOp::Gt,
            ComparisonOp::Ge => ComparisonOp::Le,
            ComparisonOp::Le => ComparisonOp::Ge,
            ComparisonOp::Eq | ComparisonOp::Ne => self,
        }
    }

    /// Apply the operator to a coerced record value and clause value.
    pub fn compare(self, lhs: f64, rhs: f64) -> bool {
        match self {
            ComparisonOp::Gt => lhs > rhs,
            ComparisonOp::Lt => lhs < rhs,
            ComparisonOp::Ge => lhs >= rhs,
            ComparisonOp::Le => lhs <= rhs,
            ComparisonOp::Eq => (lhs - rhs).abs() < EQ_EPSILON,
            ComparisonOp::Ne => (lhs - rhs).abs() >= EQ_EPSILON,
        }
    }
}

/// One retained comparison clause, normalized to `field OP value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeExpression {
    /// Resolved dataset field name.
    pub field: String,
    /// Normalized operator.
    pub op: ComparisonOp,
    /// Numeric literal.
    pub value: f64,
    /// The clause text as written in the query.
    pub original_text: String,
}

/// Whether the query contains at least one well-formed comparison
/// clause. Used by mode detection; does not resolve field tokens.
pub fn contains_comparison(query: &str) -> bool {
    FIELD_FIRST.is_match(query) || NUMBER_FIRST.is_match(query)
}

/// Extract and resolve every comparison clause in the query.
///
/// Unresolvable clauses are dropped. An empty result means the query
/// holds no usable range expression and the caller should fall back to
/// fuzzy matching over the raw text.
pub fn parse(
    query: &str,
    keys: &[String],
    records: &[Record],
    sample_depth: usize,
) -> Vec<RangeExpression> {
    let mut expressions = Vec::new();

    for captures in FIELD_FIRST.captures_iter(query) {
        let (Some(token), Some(op), Some(literal)) =
            (captures.get(1), captures.get(2), captures.get(3))
        else {
            continue;
        };
        push_clause(
            &mut expressions,
            token.as_str(),
            op.as_str(),
            literal.as_str(),
            false,
            captures.get(0).map_or("", |m| m.as_str()),
            keys,
            records,
            sample_depth,
        );
    }

    for captures in NUMBER_FIRST.captures_iter(query) {
        let (Some(literal), Some(op), Some(token)) =
            (captures.get(1), captures.get(2), captures.get(3))
        else {
            continue;
        };
        push_clause(
            &mut expressions,
            token.as_str(),
            op.as_str(),
            literal.as_str(),
            true,
            captures.get(0).map_or("", |m| m.as_str()),
            keys,
            records,
            sample_depth,
        );
    }

    expressions
}

#[allow(clippy::too_many_arguments)]
fn push_clause(
    expressions: &mut Vec<RangeExpression>,
    token: &str,
    op_symbol: &str,
    literal: &str,
    mirrored: bool,
    original: &str,
    keys: &[String],
    records: &[Record],
    sample_depth: usize,
) {
    let Some(op) = ComparisonOp::from_symbol(op_symbol) else {
        return;
    };
    let Ok(value) = literal.parse::<f64>() else {
        return;
    };
    let Some(field) = resolve_field(token, keys, records, sample_depth) else {
        tracing::debug!(token, clause = original, "dropping unresolvable range clause");
        return;
    };

    expressions.push(RangeExpression {
        field,
        op: if mirrored { op.mirror() } else { op },
        value,
        original_text: original.to_string(),
    });
}

/// Resolve a clause field token to a dataset field name.
///
/// Tried in order, first hit wins: case-insensitive exact match against
/// a configured key; case-insensitive substring match in either
/// direction against configured keys; a scan of all dataset fields
/// restricted to numeric-coercible sampled values, again by substring.
fn resolve_field(
    token: &str,
    keys: &[String],
    records: &[Record],
    sample_depth: usize,
) -> Option<String> {
    let folded = token.to_lowercase();

    if let Some(key) = keys.iter().find(|k| k.to_lowercase() == folded) {
        return Some(key.clone());
    }

    if let Some(key) = keys.iter().find(|k| {
        let key_folded = k.to_lowercase();
        key_folded.contains(&folded) || folded.contains(&key_folded)
    }) {
        return Some(key.clone());
    }

    let first = records.first()?;
    first
        .field_names()
        .filter(|name| {
            sample_field_value(records, name, sample_depth).is_some_and(FieldValue::is_numeric)
        })
        .find(|name| {
            let name_folded = name.to_lowercase();
            name_folded.contains(&folded) || folded.contains(&name_folded)
        })
        .map(str::to_string)
}

/// First non-null value for `name` within the leading `depth` records.
fn sample_field_value<'a>(records: &'a [Record], name: &str, depth: usize) -> Option<&'a FieldValue> {
    records
        .iter()
        .take(depth.max(1))
        .filter_map(|r| r.get(name))
        .find(|v| !v.is_null())
}

/// Indices of records satisfying every expression.
///
/// A record whose value fails numeric coercion fails the clause.
/// Dataset order is preserved; results are unscored.
pub fn evaluate(records: &[Record], expressions: &[RangeExpression]) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| expressions.iter().all(|expr| clause_holds(record, expr)))
        .map(|(i, _)| i)
        .collect()
}

fn clause_holds(record: &Record, expr: &RangeExpression) -> bool {
    record
        .get(&expr.field)
        .and_then(FieldValue::as_number)
        .is_some_and(|n| expr.op.compare(n, expr.value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> (Vec<Record>, Vec<String>) {
        let records = vec![
            Record::new().with("name", "Alice").with("age", 30),
            Record::new().with("name", "Bob").with("age", 45),
            Record::new().with("name", "Carol").with("age", 22),
        ];
        (records, vec!["name".to_string(), "age".to_string()])
    }

    #[test]
    fn test_parse_field_first() {
        let (records, keys) = dataset();
        let exprs = parse("age>25", &keys, &records, 5);

        assert_eq!(exprs.len(), 1);
        assert_eq!(exprs[0].field, "age");
        assert_eq!(exprs[0].op, ComparisonOp::Gt);
        assert_eq!(exprs[0].value, 25.0);
        assert_eq!(exprs[0].original_text, "age>25");
    }

    #[test]
    fn test_flip_normalization() {
        let (records, keys) = dataset();
        let field_first = parse("age>25", &keys, &records, 5);
        let number_first = parse("25<age", &keys, &records, 5);

        assert_eq!(field_first[0].field, number_first[0].field);
        assert_eq!(field_first[0].op, number_first[0].op);
        assert_eq!(field_first[0].value, number_first[0].value);
    }

    #[test]
    fn test_mirror_keeps_equality() {
        assert_eq!(ComparisonOp::Eq.mirror(), ComparisonOp::Eq);
        assert_eq!(ComparisonOp::Ne.mirror(), ComparisonOp::Ne);
        assert_eq!(ComparisonOp::Ge.mirror(), ComparisonOp::Le);
    }

    #[test]
    fn test_multiple_clauses() {
        let (records, keys) = dataset();
        let exprs = parse("age>25 age<40", &keys, &records, 5);
        assert_eq!(exprs.len(), 2);

        let hits = evaluate(&records, &exprs);
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn test_and_semantics() {
        let (records, keys) = dataset();
        let exprs = parse("age>25", &keys, &records, 5);
        assert_eq!(evaluate(&records, &exprs), vec![0, 1]);
    }

    #[test]
    fn test_case_insensitive_key_resolution() {
        let (records, keys) = dataset();
        let exprs = parse("AGE>25", &keys, &records, 5);
        assert_eq!(exprs[0].field, "age");
    }

    #[test]
    fn test_substring_key_resolution() {
        let records = vec![Record::new().with("name", "A").with("baseSalary", 5000)];
        let keys = vec!["name".to_string(), "baseSalary".to_string()];

        let exprs = parse("salary>=4000", &keys, &records, 5);
        assert_eq!(exprs[0].field, "baseSalary");
        assert_eq!(exprs[0].op, ComparisonOp::Ge);
    }

    #[test]
    fn test_fallback_to_unconfigured_numeric_field() {
        let records = vec![Record::new().with("name", "A").with("overtimeHours", 12)];
        let keys = vec!["name".to_string()];

        let exprs = parse("overtime>10", &keys, &records, 5);
        assert_eq!(exprs.len(), 1);
        assert_eq!(exprs[0].field, "overtimeHours");
    }

    #[test]
    fn test_fallback_skips_text_fields() {
        let records = vec![Record::new().with("name", "A").with("overtimeNote", "lots")];
        let keys = vec![];

        let exprs = parse("overtime>10", &keys, &records, 5);
        assert!(exprs.is_empty());
    }

    #[test]
    fn test_unresolvable_clause_dropped() {
        let (records, keys) = dataset();
        let exprs = parse("bogus>10 age<40", &keys, &records, 5);

        assert_eq!(exprs.len(), 1);
        assert_eq!(exprs[0].field, "age");
    }

    #[test]
    fn test_malformed_clause_yields_nothing() {
        let (records, keys) = dataset();
        assert!(parse("age>>", &keys, &records, 5).is_empty());
        assert!(!contains_comparison("age>>"));
    }

    #[test]
    fn test_coercion_failure_excludes_record() {
        let records = vec![
            Record::new().with("age", "30"),
            Record::new().with("age", "unknown"),
            Record::new().with("age", crate::record::FieldValue::Null),
        ];
        let keys = vec!["age".to_string()];

        let exprs = parse("age>25", &keys, &records, 5);
        assert_eq!(evaluate(&records, &exprs), vec![0]);
    }

    #[test]
    fn test_equality_with_float_literal() {
        let records = vec![Record::new().with("rate", 7.5), Record::new().with("rate", 8.0)];
        let keys = vec!["rate".to_string()];

        let exprs = parse("rate=7.5", &keys, &records, 5);
        assert_eq!(evaluate(&records, &exprs), vec![0]);

        let exprs = parse("rate!=7.5", &keys, &records, 5);
        assert_eq!(evaluate(&records, &exprs), vec![1]);
    }

    #[test]
    fn test_negative_literal() {
        let records = vec![
            Record::new().with("balance", -20),
            Record::new().with("balance", 5),
        ];
        let keys = vec!["balance".to_string()];

        let exprs = parse("balance<-10", &keys, &records, 5);
        assert_eq!(exprs[0].value, -10.0);
        assert_eq!(evaluate(&records, &exprs), vec![0]);
    }

    #[test]
    fn test_between_shorthand() {
        // Both mirrored clauses normalize onto the same field: age>10, age<50.
        let (records, keys) = dataset();
        let exprs = parse("10<age 50>age", &keys, &records, 5);
        assert_eq!(exprs.len(), 2);

        let hits = evaluate(&records, &exprs);
        assert_eq!(hits, vec![0, 1, 2]);
    }
}
