//! Existence preconditions for conditional writes.

use crate::config::Operation;
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    AttributeExists(String),
    AttributeNotExists(String),
}

impl Condition {
    pub fn attribute(&self) -> &str {
        match self {
            Condition::AttributeExists(a) | Condition::AttributeNotExists(a) => a,
        }
    }

    fn function(&self) -> &'static str {
        match self {
            Condition::AttributeExists(_) => "attribute_exists",
            Condition::AttributeNotExists(_) => "attribute_not_exists",
        }
    }
}

/// Conjunction of existence checks against the item currently stored at the target key.
/// An empty expression places no precondition on the write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConditionExpression {
    clauses: Vec<Condition>,
}

impl ConditionExpression {
    pub fn clauses(&self) -> &[Condition] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Render with `#kN` name placeholders, returning the expression and the placeholder map.
    pub fn with_placeholders(&self) -> (String, HashMap<String, String>) {
        let mut names = HashMap::with_capacity(self.clauses.len());
        let rendered = self
            .clauses
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let placeholder = format!("#k{}", i);
                names.insert(placeholder.clone(), c.attribute().to_string());
                format!("{}({})", c.function(), placeholder)
            })
            .collect::<Vec<_>>()
            .join(" AND ");
        (rendered, names)
    }
}

impl fmt::Display for ConditionExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{}({})", c.function(), c.attribute())?;
        }
        Ok(())
    }
}

pub struct ConditionPlanner;

impl ConditionPlanner {
    /// Create rejects an existing item, Update rejects a missing one; reads and deletes are unconditioned.
    pub fn plan<'a, I>(operation: Operation, key_names: I) -> ConditionExpression
    where
        I: IntoIterator<Item = &'a str>,
    {
        let clause: fn(String) -> Condition = match operation {
            Operation::Create => Condition::AttributeNotExists,
            Operation::Update => Condition::AttributeExists,
            Operation::Get | Operation::Delete => return ConditionExpression::default(),
        };
        ConditionExpression {
            clauses: key_names.into_iter().map(|n| clause(n.to_string())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_absence_in_key_order() {
        let expr = ConditionPlanner::plan(Operation::Create, ["pkey", "id"]);
        assert_eq!(expr.to_string(), "attribute_not_exists(pkey) AND attribute_not_exists(id)");
    }

    #[test]
    fn update_requires_presence() {
        let expr = ConditionPlanner::plan(Operation::Update, ["id"]);
        assert_eq!(expr.clauses(), &[Condition::AttributeExists("id".into())]);
        assert_eq!(expr.to_string(), "attribute_exists(id)");
    }

    #[test]
    fn reads_and_deletes_have_no_condition() {
        assert!(ConditionPlanner::plan(Operation::Get, ["id"]).is_empty());
        assert!(ConditionPlanner::plan(Operation::Delete, ["id"]).is_empty());
    }

    #[test]
    fn empty_key_list_is_empty_expression() {
        let expr = ConditionPlanner::plan(Operation::Create, std::iter::empty());
        assert!(expr.is_empty());
        assert_eq!(expr.to_string(), "");
    }

    #[test]
    fn placeholders_map_back_to_names() {
        let (rendered, names) = ConditionPlanner::plan(Operation::Create, ["pkey", "id"]).with_placeholders();
        assert_eq!(rendered, "attribute_not_exists(#k0) AND attribute_not_exists(#k1)");
        assert_eq!(names.get("#k0").map(String::as_str), Some("pkey"));
        assert_eq!(names.get("#k1").map(String::as_str), Some("id"));
    }
}
