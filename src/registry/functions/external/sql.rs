//! SQL(connection, query, column?) - single value from a database query

use crate::registry::function::{
    EvaluationContext, ExpressionFunction, FunctionError, FunctionResult, arg,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo};
use indexmap::IndexMap;
use thiserror::Error;

/// One result row, columns in select order
pub type SqlRow = IndexMap<String, String>;

/// Errors reported by a [`SqlExecutor`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqlError {
    /// No connection is configured under this name
    #[error("Unknown database connection '{0}'")]
    UnknownConnection(String),

    /// The database rejected the query
    #[error("Query failed: {0}")]
    Query(String),
}

/// Database access used by `SQL`.
///
/// The engine ships no database driver; hosts inject an implementation
/// through the engine builder.
pub trait SqlExecutor: Send + Sync {
    /// Run `query` on the named connection and return all rows
    fn query(&self, connection: &str, query: &str) -> Result<Vec<SqlRow>, SqlError>;
}

/// SQL(connection, query, column?) - value of `column` (or the first column)
/// in the first result row
pub struct SqlFunction;

impl ExpressionFunction for SqlFunction {
    fn name(&self) -> &str {
        "SQL"
    }
    fn human_friendly_name(&self) -> &str {
        "SQL Query"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "SQL",
                vec![
                    ParameterInfo::required("connection"),
                    ParameterInfo::required("query"),
                    ParameterInfo::optional("column"),
                ],
            )
        });
        &SIG
    }
    fn documentation(&self) -> &str {
        "Runs `query` on a configured database connection and returns `column` of the \
         first row. Empty when no database is attached, the query fails or returns no rows."
    }
    fn evaluate(&self, args: &[String], context: &EvaluationContext<'_>) -> FunctionResult<String> {
        let Some(sql) = context.sql else {
            return Err(FunctionError::Unsupported {
                name: self.name().to_string(),
                message: "no database executor configured".to_string(),
            });
        };

        let rows = sql
            .query(arg(args, 0), arg(args, 1))
            .map_err(|e| FunctionError::evaluation(self.name(), e.to_string()))?;
        let Some(row) = rows.first() else {
            return Ok(String::new());
        };

        let value = match args.get(2).filter(|c| !c.is_empty()) {
            Some(column) => row
                .get(column.as_str())
                .or_else(|| {
                    row.iter()
                        .find(|(name, _)| name.eq_ignore_ascii_case(column))
                        .map(|(_, value)| value)
                })
                .ok_or_else(|| {
                    FunctionError::invalid_argument(
                        self.name(),
                        2,
                        format!("column '{column}' not in result"),
                    )
                })?,
            None => match row.first() {
                Some((_, value)) => value,
                None => return Ok(String::new()),
            },
        };
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::functions::test_support::TestEnv;
    use rstest::rstest;

    struct CustomerDb;

    impl SqlExecutor for CustomerDb {
        fn query(&self, connection: &str, query: &str) -> Result<Vec<SqlRow>, SqlError> {
            if connection != "erp" {
                return Err(SqlError::UnknownConnection(connection.to_string()));
            }
            if query.contains("4711") {
                let mut row = SqlRow::new();
                row.insert("Id".to_string(), "4711".to_string());
                row.insert("Name".to_string(), "Muster GmbH".to_string());
                return Ok(vec![row]);
            }
            Ok(Vec::new())
        }
    }

    #[rstest]
    #[case(&["erp", "SELECT * FROM c WHERE id=4711", "Name"], "Muster GmbH")]
    #[case(&["erp", "SELECT * FROM c WHERE id=4711", "name"], "Muster GmbH")]
    #[case(&["erp", "SELECT * FROM c WHERE id=4711"], "4711")]
    #[case(&["erp", "SELECT * FROM c WHERE id=1", "Name"], "")]
    #[case(&["erp", "SELECT * FROM c WHERE id=4711", "Street"], "")]
    #[case(&["crm", "SELECT 1", "Name"], "")]
    fn test_sql(#[case] args: &[&str], #[case] expected: &str) {
        let env = TestEnv {
            sql: Some(Box::new(CustomerDb)),
            ..TestEnv::default()
        };
        assert_eq!(env.call_or_fallback(&SqlFunction, args), expected);
    }

    #[test]
    fn test_without_executor() {
        let env = TestEnv::default();
        assert!(matches!(
            env.call(&SqlFunction, &["erp", "SELECT 1"]),
            Err(FunctionError::Unsupported { .. })
        ));
    }
}
