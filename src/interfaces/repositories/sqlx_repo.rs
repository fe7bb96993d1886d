use sqlx::{encode::Encode, PgPool, Postgres, QueryBuilder, Type};
use uuid::Uuid;

use crate::entities::option_fields::OptionField;

#[derive(Clone)]
pub struct SqlxUserRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxCompanyRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxJobRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxApplicationRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxReviewRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxRoundRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxExperienceRepo {
    pub pool: PgPool,
}

/// `%term%` for ILIKE, with LIKE wildcards in the term escaped.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Non-blank search term, if any.
pub(crate) fn search_term(search: &Option<String>) -> Option<&str> {
    search.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Appends `AND (a ILIKE $n OR b ILIKE $n ...)` over `columns`.
pub(crate) fn push_search(builder: &mut QueryBuilder<'static, Postgres>, columns: &[&str], term: &str) {
    let pattern = like_pattern(term);
    builder.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            builder.push(" OR ");
        }
        builder.push(*column).push(" ILIKE ").push_bind(pattern.clone());
    }
    builder.push(")");
}

/// `UPDATE <table> SET ...` assembled from partial-update requests.
///
/// `updated_at` is always refreshed, so a patch with no fields still succeeds
/// and returns the current row.
pub(crate) struct UpdateBuilder {
    builder: QueryBuilder<'static, Postgres>,
}

impl UpdateBuilder {
    pub fn new(table: &str) -> Self {
        UpdateBuilder {
            builder: QueryBuilder::new(format!("UPDATE {} SET updated_at = NOW()", table)),
        }
    }

    /// Sets `column` when a value is present.
    pub fn set<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'static + Encode<'static, Postgres> + Type<Postgres> + Send,
    {
        if let Some(value) = value {
            self.builder.push(", ").push(column).push(" = ").push_bind(value);
        }
        self
    }

    /// Applies a nullable field: absent keeps, `null` clears, a value sets.
    pub fn patch<T>(&mut self, column: &str, value: &OptionField<T>) -> &mut Self
    where
        T: 'static + Clone + Encode<'static, Postgres> + Type<Postgres> + Send,
    {
        match value {
            OptionField::Unchanged => {}
            OptionField::SetToNull => {
                self.builder.push(", ").push(column).push(" = NULL");
            }
            OptionField::SetToValue(value) => {
                self.builder.push(", ").push(column).push(" = ").push_bind(value.clone());
            }
        }
        self
    }

    /// Applies a list field; `null` stores the empty list, never NULL.
    pub fn patch_list<T>(&mut self, column: &str, value: &OptionField<Vec<T>>) -> &mut Self
    where
        T: Clone,
        Vec<T>: 'static + Encode<'static, Postgres> + Type<Postgres> + Send,
    {
        match value {
            OptionField::Unchanged => {}
            OptionField::SetToNull => {
                self.builder.push(", ").push(column).push(" = '{}'");
            }
            OptionField::SetToValue(items) => {
                self.builder.push(", ").push(column).push(" = ").push_bind(items.clone());
            }
        }
        self
    }

    /// Raw assignment such as `last_updated = NOW()`.
    pub fn raw(&mut self, assignment: &str) -> &mut Self {
        self.builder.push(", ").push(assignment);
        self
    }

    /// Finishes with `WHERE id = $n RETURNING *`.
    pub fn where_id(mut self, id: Uuid) -> QueryBuilder<'static, Postgres> {
        self.builder.push(" WHERE id = ").push_bind(id).push(" RETURNING *");
        self.builder
    }

    /// Like `where_id`, but the row must also satisfy `condition` when the
    /// statement runs.
    pub fn where_id_and(mut self, id: Uuid, condition: &str) -> QueryBuilder<'static, Postgres> {
        self.builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND ")
            .push(condition)
            .push(" RETURNING *");
        self.builder
    }
}
