//! Selector evaluation for in-memory stores
//!
//! Supported operators (case-insensitive):
//!
//! | Operator | Right operand | Matches when |
//! |----------|---------------|--------------|
//! | `=`      | any value     | property equals the operand |
//! | `!=`     | any value     | property is missing or differs |
//! | `in`     | array         | property equals one of the elements |
//! | `like`   | string        | string property matches, `%` matches any run of characters |

use catalog_core::{Asset, AssetSelector, Criterion, SelectorError};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Eq,
    NotEq,
    In,
    Like,
}

impl Operator {
    fn parse(criterion: &Criterion) -> Result<Self, SelectorError> {
        let op = match criterion.operator.to_ascii_lowercase().as_str() {
            "=" => Operator::Eq,
            "!=" => Operator::NotEq,
            "in" => Operator::In,
            "like" => Operator::Like,
            other => return Err(SelectorError::UnsupportedOperator(other.to_string())),
        };

        match (op, &criterion.operand_right) {
            (Operator::In, Value::Array(_)) | (Operator::Like, Value::String(_)) => Ok(op),
            (Operator::In, _) => Err(SelectorError::InvalidOperand {
                operator: criterion.operator.clone(),
                expected: "an array",
            }),
            (Operator::Like, _) => Err(SelectorError::InvalidOperand {
                operator: criterion.operator.clone(),
                expected: "a string",
            }),
            _ => Ok(op),
        }
    }
}

/// A selector whose criteria have been checked and parsed once
#[derive(Debug)]
pub struct CompiledSelector<'a> {
    clauses: Vec<(Operator, &'a Criterion)>,
}

impl<'a> CompiledSelector<'a> {
    /// Validate every criterion of `selector`
    pub fn compile(selector: &'a AssetSelector) -> Result<Self, SelectorError> {
        let clauses = selector
            .criteria()
            .iter()
            .map(|c| Operator::parse(c).map(|op| (op, c)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { clauses })
    }

    /// True if `asset` satisfies every criterion
    pub fn matches(&self, asset: &Asset) -> bool {
        self.clauses.iter().all(|(op, criterion)| {
            let property = asset.property(&criterion.operand_left);
            let right = &criterion.operand_right;
            match (op, property) {
                (Operator::Eq, Some(left)) => values_equal(&left, right),
                (Operator::NotEq, Some(left)) => !values_equal(&left, right),
                (Operator::NotEq, None) => true,
                (Operator::In, Some(left)) => right
                    .as_array()
                    .is_some_and(|items| items.iter().any(|item| values_equal(&left, item))),
                (Operator::Like, Some(Value::String(left))) => right
                    .as_str()
                    .is_some_and(|pattern| like_matches(pattern, &left)),
                _ => false,
            }
        })
    }
}

/// Numbers and strings compare by their textual form, so `"5"` equals `5`
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(l), Value::Number(r)) | (Value::Number(r), Value::String(l)) => {
            *l == r.to_string()
        }
        _ => left == right,
    }
}

fn like_matches(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('%').collect();
    if parts.len() == 1 {
        return pattern == text;
    }

    let (first, rest) = (parts[0], &parts[1..]);
    let Some(mut remaining) = text.strip_prefix(first) else {
        return false;
    };

    let Some((last, middle)) = rest.split_last() else {
        return false;
    };
    for part in middle {
        match remaining.find(part) {
            Some(pos) => remaining = &remaining[pos + part.len()..],
            None => return false,
        }
    }
    remaining.len() >= last.len() && remaining.ends_with(last)
}
