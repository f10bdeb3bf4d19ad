use std::collections::BTreeMap;

use crate::{
    DatabaseError,
    core::types::DataType,
    db::{
        database::QueryResponse,
        table::{Column, Row, Table},
    },
    query::{
        ast::{CreateStatement, InsertStatement, Projection, SelectStatement, Statement},
        parser::Parser,
    },
};

/// Executes query text against the database's table collection.
pub(crate) struct QueryExecutor;

impl QueryExecutor {
    pub(crate) fn execute(
        query: &str,
        tables: &mut BTreeMap<String, Table>,
    ) -> Result<QueryResponse, DatabaseError> {
        let statement = Parser::new(query)
            .parse()
            .map_err(|e| DatabaseError::InvalidQuery(e.to_string()))?;

        match statement {
            Statement::Create(statement) => Self::run_create(statement, tables),
            Statement::Insert(statement) => Self::run_insert(statement, tables),
            Statement::Select(statement) => Self::run_select(statement, tables),
        }
    }

    /// Builds every column before registering the table, so a failing
    /// definition leaves the database untouched. Re-creating an existing
    /// name replaces the old table.
    fn run_create(
        statement: CreateStatement,
        tables: &mut BTreeMap<String, Table>,
    ) -> Result<QueryResponse, DatabaseError> {
        let mut table = Table::new(statement.table_name);

        for spec in statement.columns {
            if spec.autoincrement && spec.data_type != DataType::Int32 {
                return Err(DatabaseError::InvalidQuery(format!(
                    "autoincrement requires an int32 column, but '{}' is {}",
                    spec.name, spec.data_type
                )));
            }

            let mut column = Column::new(spec.name, spec.data_type);
            column.max_len = spec.max_len;
            column.autoincrement = spec.autoincrement;
            column.unique = spec.unique;
            column.default = spec.default;

            table.add_column(column)?;
        }

        tables.insert(table.name().to_string(), table);
        Ok(QueryResponse::empty())
    }

    fn run_insert(
        statement: InsertStatement,
        tables: &mut BTreeMap<String, Table>,
    ) -> Result<QueryResponse, DatabaseError> {
        let table = tables
            .get_mut(statement.table_name)
            .ok_or_else(|| DatabaseError::TableNotFound(statement.table_name.to_string()))?;

        // Tokens bind positionally to the non-autoincrement columns in
        // declaration order; autoincrement cells are always system-assigned.
        let targets: Vec<(String, DataType)> = table
            .columns()
            .iter()
            .filter(|column| !column.autoincrement)
            .map(|column| (column.name.clone(), column.data_type))
            .collect();

        if statement.values.len() > targets.len() {
            return Err(DatabaseError::InvalidQuery(format!(
                "table '{}' takes at most {} values, got {}",
                statement.table_name,
                targets.len(),
                statement.values.len()
            )));
        }

        let mut row = Row::new();
        for (token, (name, data_type)) in statement.values.iter().zip(&targets) {
            let value = token.parse_as(*data_type).map_err(|e| {
                DatabaseError::ConstraintViolation(format!(
                    "column '{name}' expects {data_type}: {e}"
                ))
            })?;

            if !value.matches(*data_type) {
                return Err(DatabaseError::ConstraintViolation(format!(
                    "column '{name}' expects {data_type}, got {}",
                    value.data_type()
                )));
            }

            row.set_value(name.clone(), value);
        }

        table.insert_row(row)?;
        Ok(QueryResponse::empty())
    }

    fn run_select(
        statement: SelectStatement,
        tables: &mut BTreeMap<String, Table>,
    ) -> Result<QueryResponse, DatabaseError> {
        let table = tables
            .get(statement.table_name)
            .ok_or_else(|| DatabaseError::TableNotFound(statement.table_name.to_string()))?;

        let projected: Vec<String> = match &statement.projection {
            Projection::All => table
                .columns()
                .iter()
                .map(|column| column.name.clone())
                .collect(),
            Projection::Columns(names) => {
                for name in names {
                    table.get_column(name)?;
                }
                names.iter().map(|name| (*name).to_string()).collect()
            }
        };

        let rows = match &statement.predicate {
            None => table.select(|_| Ok(true))?,
            Some(predicate) => {
                let column = table.get_column(predicate.column)?;
                let data_type = column.data_type;

                if predicate.op.is_ordering() && data_type != DataType::Int32 {
                    return Err(DatabaseError::InvalidQuery(format!(
                        "ordering comparison requires an int32 column, but '{}' is {}",
                        predicate.column, data_type
                    )));
                }

                let rhs = predicate.value.parse_as(data_type).map_err(|e| {
                    DatabaseError::ConstraintViolation(format!(
                        "column '{}' expects {data_type}: {e}",
                        predicate.column
                    ))
                })?;

                let op = predicate.op;
                let name = predicate.column;
                table.select(|row| op.compare(row.get_value(name)?, &rhs))?
            }
        };

        let rows = match &statement.projection {
            Projection::All => rows,
            Projection::Columns(_) => rows
                .into_iter()
                .map(|row| {
                    let mut projected_row = Row::new();
                    for name in &projected {
                        projected_row.set_value(name.clone(), row.get_value(name)?.clone());
                    }
                    Ok(projected_row)
                })
                .collect::<Result<Vec<_>, DatabaseError>>()?,
        };

        Ok(QueryResponse {
            columns: projected,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Value;

    fn execute(tables: &mut BTreeMap<String, Table>, query: &str) -> QueryResponse {
        QueryExecutor::execute(query, tables).expect("query should succeed")
    }

    fn users_fixture() -> BTreeMap<String, Table> {
        let mut tables = BTreeMap::new();
        execute(
            &mut tables,
            "CREATE TABLE users ({autoincrement} id : int32, {unique} login: string[32], password_hash: bytes[8], is_admin: bool = false)",
        );
        tables
    }

    #[test]
    fn test_create_registers_parsed_columns() {
        let tables = users_fixture();
        let table = &tables["users"];

        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "login", "password_hash", "is_admin"]);

        assert!(table.columns()[0].autoincrement);
        assert_eq!(table.columns()[0].data_type, DataType::Int32);
        assert!(table.columns()[1].unique);
        assert_eq!(table.columns()[1].max_len, Some(32));
        assert_eq!(table.columns()[2].data_type, DataType::Bytes);
        assert_eq!(table.columns()[3].default, Some(Value::Bool(false)));
    }

    #[test]
    fn test_create_overwrites_existing_table() {
        let mut tables = users_fixture();
        execute(&mut tables, "INSERT INTO users VALUES ('Alice' 0x0102)");

        execute(&mut tables, "CREATE TABLE users (login: string)");
        assert!(tables["users"].rows().is_empty());
        assert_eq!(tables["users"].columns().len(), 1);
    }

    #[test]
    fn test_create_rejects_autoincrement_on_non_int32() {
        let mut tables = BTreeMap::new();
        let result =
            QueryExecutor::execute("CREATE TABLE t ({autoincrement} name: string)", &mut tables);

        assert!(matches!(result, Err(DatabaseError::InvalidQuery(_))));
        assert!(tables.is_empty());
    }

    #[test]
    fn test_create_failure_registers_nothing() {
        let mut tables = BTreeMap::new();
        let result =
            QueryExecutor::execute("CREATE TABLE t (a: int32, a: bool)", &mut tables);

        assert!(matches!(
            result,
            Err(DatabaseError::ConstraintViolation(_))
        ));
        assert!(tables.is_empty());
    }

    #[test]
    fn test_insert_binds_positionally_and_fills_the_rest() {
        let mut tables = users_fixture();
        execute(&mut tables, "INSERT INTO users VALUES ('Alice' 0x123abc true)");
        execute(&mut tables, "INSERT INTO users VALUES (Bob 0x789abc)");

        let rows = tables["users"].rows();
        assert_eq!(rows[0].get_value("id").unwrap(), &Value::Int32(0));
        assert_eq!(
            rows[0].get_value("login").unwrap(),
            &Value::Text("Alice".to_string())
        );
        assert_eq!(
            rows[0].get_value("password_hash").unwrap(),
            &Value::Bytes(vec![0x12, 0x3a, 0xbc])
        );
        assert_eq!(rows[0].get_value("is_admin").unwrap(), &Value::Bool(true));

        // Second insert omitted is_admin; the default fills it.
        assert_eq!(rows[1].get_value("id").unwrap(), &Value::Int32(1));
        assert_eq!(rows[1].get_value("is_admin").unwrap(), &Value::Bool(false));
    }

    #[test]
    fn test_insert_autoincrement_ignores_other_tables() {
        let mut tables = users_fixture();
        execute(&mut tables, "CREATE TABLE logs (message: string)");

        execute(&mut tables, "INSERT INTO users VALUES ('Alice' 0x01)");
        execute(&mut tables, "INSERT INTO logs VALUES (hello)");
        execute(&mut tables, "INSERT INTO logs VALUES (world)");
        execute(&mut tables, "INSERT INTO users VALUES ('Bob' 0x02)");

        let rows = tables["users"].rows();
        assert_eq!(rows[0].get_value("id").unwrap(), &Value::Int32(0));
        assert_eq!(rows[1].get_value("id").unwrap(), &Value::Int32(1));
    }

    #[test]
    fn test_insert_type_mismatch_names_column_and_type() {
        let mut tables = users_fixture();
        let result = QueryExecutor::execute(
            "INSERT INTO users VALUES ('Alice' 0x123abc notabool)",
            &mut tables,
        );

        match result {
            Err(DatabaseError::ConstraintViolation(msg)) => {
                assert!(msg.contains("is_admin"), "message was: {msg}");
                assert!(msg.contains("bool"), "message was: {msg}");
            }
            other => panic!("Expected a constraint violation, got {other:?}"),
        }
        assert!(tables["users"].rows().is_empty());
    }

    #[test]
    fn test_insert_empty_values_uses_defaults() {
        let mut tables = BTreeMap::new();
        execute(&mut tables, "CREATE TABLE t (flag: bool = false)");
        execute(&mut tables, "INSERT INTO t VALUES ()");

        assert_eq!(
            tables["t"].rows()[0].get_value("flag").unwrap(),
            &Value::Bool(false)
        );
    }

    #[test]
    fn test_insert_too_many_values() {
        let mut tables = users_fixture();
        let result = QueryExecutor::execute(
            "INSERT INTO users VALUES ('Alice' 0x01 true 42)",
            &mut tables,
        );

        assert!(matches!(result, Err(DatabaseError::InvalidQuery(_))));
    }

    #[test]
    fn test_insert_missing_table() {
        let mut tables = BTreeMap::new();
        let result = QueryExecutor::execute("INSERT INTO nope VALUES (1)", &mut tables);

        assert!(matches!(
            result,
            Err(DatabaseError::TableNotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_insert_unique_violation() {
        let mut tables = users_fixture();
        execute(&mut tables, "INSERT INTO users VALUES ('Alice' 0x01)");

        let result =
            QueryExecutor::execute("INSERT INTO users VALUES ('Alice' 0x02)", &mut tables);
        assert!(matches!(
            result,
            Err(DatabaseError::ConstraintViolation(msg)) if msg.contains("login")
        ));
        assert_eq!(tables["users"].rows().len(), 1);
    }

    #[test]
    fn test_select_star() {
        let mut tables = users_fixture();
        execute(&mut tables, "INSERT INTO users VALUES ('Alice' 0x01)");
        execute(&mut tables, "INSERT INTO users VALUES ('Bob' 0x02 true)");

        let response = execute(&mut tables, "SELECT * FROM users WHERE is_admin = false");
        assert_eq!(response.columns, ["id", "login", "password_hash", "is_admin"]);
        assert_eq!(response.rows.len(), 1);
        assert_eq!(
            response.rows[0].get_value("login").unwrap(),
            &Value::Text("Alice".to_string())
        );
    }

    #[test]
    fn test_select_projection() {
        let mut tables = users_fixture();
        execute(&mut tables, "INSERT INTO users VALUES ('Alice' 0x01)");

        let response = execute(&mut tables, "SELECT login FROM users");
        assert_eq!(response.columns, ["login"]);
        assert!(response.rows[0].has_value("login"));
        assert!(!response.rows[0].has_value("id"));
    }

    #[test]
    fn test_select_no_match_is_empty() {
        let mut tables = users_fixture();
        execute(&mut tables, "INSERT INTO users VALUES ('Alice' 0x01)");

        let response = execute(&mut tables, "SELECT * FROM users WHERE login = 'Bob'");
        assert!(response.rows.is_empty());
    }

    #[test]
    fn test_select_int32_ordering() {
        let mut tables = users_fixture();
        for (login, hash) in [("a", "0x01"), ("b", "0x02"), ("c", "0x03")] {
            execute(
                &mut tables,
                &format!("INSERT INTO users VALUES ('{login}' {hash})"),
            );
        }

        let response = execute(&mut tables, "SELECT login FROM users WHERE id > 0");
        assert_eq!(response.rows.len(), 2);
    }

    #[test]
    fn test_select_ordering_on_non_int32_fails() {
        let mut tables = users_fixture();
        let result =
            QueryExecutor::execute("SELECT * FROM users WHERE login < 'x'", &mut tables);

        assert!(matches!(result, Err(DatabaseError::InvalidQuery(_))));
    }

    #[test]
    fn test_select_unknown_column() {
        let mut tables = users_fixture();
        let result = QueryExecutor::execute("SELECT nope FROM users", &mut tables);

        assert!(matches!(
            result,
            Err(DatabaseError::ColumnNotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_malformed_statement_is_invalid_query() {
        let mut tables = BTreeMap::new();
        for query in [
            "DROP TABLE users",
            "CREATE TABLE",
            "INSERT users VALUES (1)",
            "not a query at all",
        ] {
            let result = QueryExecutor::execute(query, &mut tables);
            assert!(
                matches!(result, Err(DatabaseError::InvalidQuery(_))),
                "query {query:?} should be rejected"
            );
        }
    }
}
