//! Composable WHERE-clause builder carrying the soft-delete visibility rule.
//!
//! # Invariants
//! - Column names are `'static` identifiers chosen by repository code; only
//!   values are bound as parameters.
//! - A builder created with [`Visibility::Active`] always emits
//!   `{alias}.deleted_at IS NULL` as its first clause.

use rusqlite::types::Value;

/// Which rows a read may observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Only rows with `deleted_at IS NULL`.
    #[default]
    Active,
    /// Active and soft-deleted rows alike.
    #[cfg(test)]
    IncludeDeleted,
}

impl Visibility {
    /// SQL predicate for the table aliased as `alias`, if any.
    pub fn predicate(self, alias: &str) -> Option<String> {
        match self {
            Self::Active => Some(format!("{alias}.deleted_at IS NULL")),
            #[cfg(test)]
            Self::IncludeDeleted => None,
        }
    }
}

/// AND-joined conditions over one aliased table plus their bind values.
#[derive(Debug, Clone)]
pub struct Conditions {
    alias: &'static str,
    clauses: Vec<String>,
    binds: Vec<Value>,
}

impl Conditions {
    pub fn new(alias: &'static str, visibility: Visibility) -> Self {
        Self {
            alias,
            clauses: visibility.predicate(alias).into_iter().collect(),
            binds: Vec::new(),
        }
    }

    /// Shorthand for `Conditions::new(alias, Visibility::Active)`.
    pub fn active(alias: &'static str) -> Self {
        Self::new(alias, Visibility::Active)
    }

    pub fn eq_text(self, column: &'static str, value: impl Into<String>) -> Self {
        self.push(column, "= ?", [Value::Text(value.into())])
    }

    pub fn eq_int(self, column: &'static str, value: i64) -> Self {
        self.push(column, "= ?", [Value::Integer(value)])
    }

    pub fn eq_bool(self, column: &'static str, value: bool) -> Self {
        self.eq_int(column, i64::from(value))
    }

    /// Inclusive range, `min <= column <= max`.
    pub fn between(self, column: &'static str, min: i64, max: i64) -> Self {
        self.push(
            column,
            "BETWEEN ? AND ?",
            [Value::Integer(min), Value::Integer(max)],
        )
    }

    /// Case-sensitive suffix match. Unlike `LIKE`, `%` and `_` in `suffix`
    /// are matched literally.
    pub fn ends_with(mut self, column: &'static str, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        self.clauses
            .push(format!("substr({}.{column}, -length(?)) = ?", self.alias));
        self.binds.push(Value::Text(suffix.clone()));
        self.binds.push(Value::Text(suffix));
        self
    }

    /// `" WHERE ..."` or an empty string when there are no clauses.
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn into_binds(self) -> Vec<Value> {
        self.binds
    }

    fn push<const N: usize>(
        mut self,
        column: &'static str,
        operator: &str,
        values: [Value; N],
    ) -> Self {
        self.clauses
            .push(format!("{}.{column} {operator}", self.alias));
        self.binds.extend(values);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Conditions, Visibility};
    use rusqlite::types::Value;

    #[test]
    fn active_conditions_always_hide_deleted_rows() {
        let conditions = Conditions::active("r");
        assert_eq!(conditions.where_sql(), " WHERE r.deleted_at IS NULL");
        assert!(conditions.into_binds().is_empty());
    }

    #[test]
    fn include_deleted_emits_no_visibility_clause() {
        let conditions = Conditions::new("u", Visibility::IncludeDeleted);
        assert_eq!(conditions.where_sql(), "");

        let conditions = conditions.eq_text("email", "a@x.com");
        assert_eq!(conditions.where_sql(), " WHERE u.email = ?");
    }

    #[test]
    fn clauses_and_binds_keep_call_order() {
        let conditions = Conditions::active("r")
            .eq_text("make", "Toyota")
            .eq_bool("is_approved", true)
            .between("year", 2019, 2020);

        assert_eq!(
            conditions.where_sql(),
            " WHERE r.deleted_at IS NULL AND r.make = ? AND r.is_approved = ? AND r.year BETWEEN ? AND ?"
        );
        assert_eq!(
            conditions.into_binds(),
            vec![
                Value::Text("Toyota".to_string()),
                Value::Integer(1),
                Value::Integer(2019),
                Value::Integer(2020),
            ]
        );
    }

    #[test]
    fn ends_with_binds_suffix_twice() {
        let conditions = Conditions::active("u").ends_with("email", "@example.com");
        assert_eq!(
            conditions.where_sql(),
            " WHERE u.deleted_at IS NULL AND substr(u.email, -length(?)) = ?"
        );
        assert_eq!(conditions.into_binds().len(), 2);
    }
}
