//! SQL conversions for the label enums. Labels are stored as text; reading
//! never fails on an unexpected value, it yields the `Unknown` variant.
//! Writing stores the normalized label, so an `Unknown` that spells a known
//! label is persisted under its canonical spelling.

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::models::{Category, Condition};

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Category::Unknown(_) => Ok(ToSqlOutput::from(self.normalized().label().to_string())),
            known => Ok(ToSqlOutput::from(known.label())),
        }
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(Category::parse)
    }
}

impl ToSql for Condition {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Condition::Unknown(_) => Ok(ToSqlOutput::from(self.normalized().label().to_string())),
            known => Ok(ToSqlOutput::from(known.label())),
        }
    }
}

impl FromSql for Condition {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(Condition::parse)
    }
}
