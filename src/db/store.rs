//! Record store: single-statement execution with guaranteed release.
//!
//! Statements are always parameterized; user input is never interpolated into
//! statement text. Each call acquires its own connection, runs one statement,
//! and drops the connection before returning, success or failure.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use sqlx::mysql::{MySql, MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Connection, Row, TypeInfo, ValueRef};

use super::provider::ConnectionProvider;
use super::DbError;

/// Positional statement parameter, bound out-of-band.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

/// Outcome of a mutating statement.
#[derive(Debug, Clone, Copy)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Auto-increment id assigned by the last INSERT, 0 otherwise.
    pub last_insert_id: u64,
}

/// One result row as an ordered mapping from column name to value.
///
/// Column order is the order the database returned; serialization preserves
/// it. No client-side re-sorting happens anywhere in this layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowMap(Vec<(String, Value)>);

impl RowMap {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    fn from_pairs(pairs: Vec<(String, Value)>) -> Self {
        Self(pairs)
    }
}

impl Serialize for RowMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Executes parameterized statements against connections from the provider.
#[derive(Clone)]
pub struct RecordStore {
    provider: ConnectionProvider,
}

impl RecordStore {
    pub fn new(provider: ConnectionProvider) -> Self {
        Self { provider }
    }

    /// Run a mutating statement inside a transaction: commit on success, roll
    /// back on any execution error. Pass `&[]` when the statement has no
    /// placeholders.
    pub async fn execute(
        &self,
        statement: &str,
        params: &[SqlParam],
    ) -> Result<ExecResult, DbError> {
        let mut conn = self.provider.acquire().await?;
        let mut tx = conn.begin().await?;

        let result = match bind_params(statement, params).execute(&mut *tx).await {
            Ok(result) => result,
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                return Err(DbError::Query(err));
            }
        };

        tx.commit().await?;

        Ok(ExecResult {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_id(),
        })
    }

    /// Run a read-only statement and map every row, in database order.
    /// Returns an empty vec, not an error, when nothing matches.
    pub async fn fetch_all(
        &self,
        statement: &str,
        params: &[SqlParam],
    ) -> Result<Vec<RowMap>, DbError> {
        let mut conn = self.provider.acquire().await?;
        let rows = bind_params(statement, params).fetch_all(&mut *conn).await?;

        rows.iter().map(map_row).collect()
    }

    /// Like [`fetch_all`](Self::fetch_all) but only the first row, or `None`.
    pub async fn fetch_one(
        &self,
        statement: &str,
        params: &[SqlParam],
    ) -> Result<Option<RowMap>, DbError> {
        let mut conn = self.provider.acquire().await?;
        let row = bind_params(statement, params)
            .fetch_optional(&mut *conn)
            .await?;

        row.as_ref().map(map_row).transpose()
    }
}

fn bind_params<'q>(statement: &'q str, params: &'q [SqlParam]) -> Query<'q, MySql, MySqlArguments> {
    let mut query = sqlx::query(statement);
    for param in params {
        query = match param {
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Text(v) => query.bind(v.as_str()),
        };
    }
    query
}

fn map_row(row: &MySqlRow) -> Result<RowMap, DbError> {
    let mut pairs = Vec::with_capacity(row.len());
    for (index, column) in row.columns().iter().enumerate() {
        pairs.push((column.name().to_owned(), decode_value(row, index)?));
    }
    Ok(RowMap(pairs))
}

/// Decode one column into a JSON value by driver type name. Timestamps come
/// out as RFC 3339 strings; anything unrecognized falls back to text.
fn decode_value(row: &MySqlRow, index: usize) -> Result<Value, DbError> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let type_name = raw.type_info().name().to_owned();
    let value = match type_name.as_str() {
        "BOOLEAN" => Value::from(row.try_get::<bool, _>(index)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            Value::from(row.try_get::<i64, _>(index)?)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => Value::from(row.try_get::<u64, _>(index)?),
        "FLOAT" | "DOUBLE" => Value::from(row.try_get::<f64, _>(index)?),
        "TIMESTAMP" | "DATETIME" => {
            Value::String(row.try_get::<DateTime<Utc>, _>(index)?.to_rfc3339())
        }
        _ => Value::String(row.try_get::<String, _>(index)?),
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_map_preserves_column_order() {
        let row = RowMap::from_pairs(vec![
            ("zeta".into(), json!(1)),
            ("alpha".into(), json!("x")),
            ("mid".into(), Value::Null),
        ]);

        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, ["zeta", "alpha", "mid"]);

        let serialized = serde_json::to_string(&row).unwrap();
        assert_eq!(serialized, r#"{"zeta":1,"alpha":"x","mid":null}"#);
    }

    #[test]
    fn row_map_lookup_by_name() {
        let row = RowMap::from_pairs(vec![
            ("id".into(), json!(7)),
            ("name".into(), json!("Ada")),
        ]);

        assert_eq!(row.get("name"), Some(&json!("Ada")));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn params_from_conversions() {
        assert_eq!(SqlParam::from(42i64), SqlParam::Int(42));
        assert_eq!(SqlParam::from("hi"), SqlParam::Text("hi".into()));
        assert_eq!(SqlParam::from(String::from("ho")), SqlParam::Text("ho".into()));
    }
}
