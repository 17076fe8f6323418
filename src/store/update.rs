//! Partial-update builder.
//!
//! Renders `UPDATE <table> SET col=$1, ... WHERE id=$N` for exactly the
//! columns that were given a value. Column names come from a fixed enum per
//! table and never from request data. Placeholders are numbered while the
//! arguments are pushed, so both always line up.

use sea_orm::{ConnectionTrait, DbBackend, DbErr, Statement, Value};

/// A column that may appear in the SET clause of a partial update.
///
/// The derived `Ord` decides the order columns are rendered in, so variants
/// must be declared in the table's column order.
pub trait UpdateColumn: Copy + Ord {
    const TABLE: &'static str;

    fn name(self) -> &'static str;
}

#[derive(Clone, Debug)]
pub struct PartialUpdate<C> {
    assignments: Vec<(C, Value)>,
}

impl<C: UpdateColumn> Default for PartialUpdate<C> {
    fn default() -> Self {
        Self {
            assignments: Vec::new(),
        }
    }
}

impl<C: UpdateColumn> PartialUpdate<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `column` when `value` is present. Setting a column twice keeps
    /// the last value.
    pub fn set<V: Into<Value>>(mut self, column: C, value: Option<V>) -> Self {
        if let Some(value) = value {
            let value = value.into();
            match self
                .assignments
                .iter_mut()
                .find(|(existing, _)| *existing == column)
            {
                Some(slot) => slot.1 = value,
                None => self.assignments.push((column, value)),
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Renders the SQL text and its positional arguments. The entity id is
    /// always the last argument.
    pub fn build(mut self, id: &str) -> (String, Vec<Value>) {
        self.assignments.sort_by_key(|(column, _)| *column);

        let mut clauses = Vec::with_capacity(self.assignments.len());
        let mut values = Vec::with_capacity(self.assignments.len() + 1);
        for (column, value) in self.assignments {
            values.push(value);
            clauses.push(format!("{}=${}", column.name(), values.len()));
        }
        values.push(Value::from(id));

        let sql = format!(
            "UPDATE {} SET {} WHERE id=${}",
            C::TABLE,
            clauses.join(", "),
            values.len()
        );
        (sql, values)
    }

    pub fn into_statement(self, backend: DbBackend, id: &str) -> Statement {
        let (sql, values) = self.build(id);
        Statement::from_sql_and_values(backend, sql, values)
    }
}

/// Runs the update and returns the number of rows it touched.
///
/// An update without columns renders an empty SET list, which no SQL engine
/// accepts, so it is treated as a no-op and nothing is sent (`None`).
pub async fn execute<C, Conn>(
    conn: &Conn,
    id: &str,
    update: PartialUpdate<C>,
) -> Result<Option<u64>, DbErr>
where
    C: UpdateColumn,
    Conn: ConnectionTrait,
{
    if update.is_empty() {
        return Ok(None);
    }

    let statement = update.into_statement(conn.get_database_backend(), id);
    let result = conn.execute(statement).await?;
    Ok(Some(result.rows_affected()))
}
