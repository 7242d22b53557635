//! Property-based tests for the query builders
//!
//! These tests verify the rendering contract of the builder family:
//! - every staged or filtered value becomes exactly one `?` placeholder
//! - bound parameters line up with placeholders, in order
//! - clause order in the emitted SQL matches call order

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use std::sync::Arc;

    use relite::{
        Connection, ConnectionConfig, ConnectionRegistry, InsertQuery, Join, SelectQuery,
        UpdateQuery, Value,
    };

    // Test infrastructure

    /// A disconnected connection is enough for rendering; nothing here
    /// touches a database.
    fn detached_conn() -> Connection {
        Connection::with_registry(
            ConnectionConfig::default(),
            Arc::new(ConnectionRegistry::new()),
        )
    }

    fn placeholders(sql: &str) -> usize {
        sql.matches('?').count()
    }

    // Strategy helpers

    fn arb_column() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,8}".prop_map(|s: String| s)
    }

    fn arb_op() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("=".to_string()),
            Just("!=".to_string()),
            Just("<".to_string()),
            Just(">".to_string()),
            Just("<=".to_string()),
            Just(">=".to_string()),
            Just("LIKE".to_string()),
        ]
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<i64>().prop_map(Value::Integer),
            any::<f64>().prop_filter("finite", |f| f.is_finite()).prop_map(Value::Real),
            "[a-zA-Z0-9 ]{0,16}".prop_map(Value::Text),
        ]
    }

    fn arb_predicates() -> impl Strategy<Value = Vec<(String, String, Value)>> {
        prop::collection::vec((arb_column(), arb_op(), arb_value()), 1..8)
    }

    /// Column/value pairs with names made unique by index, so staging
    /// never overwrites and the expected ordering is the input ordering.
    fn arb_assignments() -> impl Strategy<Value = Vec<(String, Value)>> {
        prop::collection::vec((arb_column(), arb_value()), 1..8).prop_map(|pairs| {
            pairs
                .into_iter()
                .enumerate()
                .map(|(i, (column, value))| (format!("{}_{}", column, i), value))
                .collect()
        })
    }

    // Property tests

    proptest! {
        /// Every predicate contributes exactly one placeholder and one
        /// bound parameter, in call order.
        #[test]
        fn prop_select_placeholders_match_params(predicates in arb_predicates()) {
            let mut query: SelectQuery = SelectQuery::new("t", detached_conn());
            for (column, op, value) in &predicates {
                query = query.where_op(column.as_str(), op.as_str(), value.clone());
            }

            let (sql, params) = query.build();
            prop_assert_eq!(placeholders(&sql), predicates.len());
            prop_assert_eq!(params.len(), predicates.len());

            let expected: Vec<Value> = predicates.iter().map(|(_, _, v)| v.clone()).collect();
            prop_assert_eq!(params, expected);
        }

        /// The emitted WHERE clause preserves predicate call order.
        #[test]
        fn prop_select_preserves_clause_order(predicates in arb_predicates()) {
            let mut query: SelectQuery = SelectQuery::new("t", detached_conn());
            for (column, op, value) in &predicates {
                query = query.where_op(column.as_str(), op.as_str(), value.clone());
            }

            let (sql, _) = query.build();
            let expected: Vec<String> = predicates
                .iter()
                .map(|(column, op, _)| format!("{} {} ?", column, op))
                .collect();
            let expected_sql = format!("SELECT * FROM t WHERE {}", expected.join(" AND "));
            prop_assert_eq!(sql, expected_sql);
        }

        /// INSERT emits one placeholder per staged pair and binds the
        /// staged values in staging order.
        #[test]
        fn prop_insert_binds_in_staging_order(assignments in arb_assignments()) {
            let mut query = InsertQuery::new("t", detached_conn());
            for (column, value) in &assignments {
                query = query.set(column.as_str(), value.clone());
            }

            let (sql, params) = query.build().unwrap();
            prop_assert_eq!(placeholders(&sql), assignments.len());

            let expected_columns: Vec<&str> =
                assignments.iter().map(|(c, _)| c.as_str()).collect();
            prop_assert!(sql.contains(&expected_columns.join(", ")));

            let expected: Vec<Value> = assignments.iter().map(|(_, v)| v.clone()).collect();
            prop_assert_eq!(params, expected);
        }

        /// UPDATE binds set-values before where-values, each matching
        /// its placeholder position.
        #[test]
        fn prop_update_orders_set_before_where(
            assignments in arb_assignments(),
            predicates in arb_predicates(),
        ) {
            let mut query = UpdateQuery::new("t", detached_conn());
            for (column, value) in &assignments {
                query = query.set(column.as_str(), value.clone());
            }
            for (column, op, value) in &predicates {
                query = query.where_op(column.as_str(), op.as_str(), value.clone());
            }

            let (sql, params) = query.build().unwrap();
            prop_assert_eq!(placeholders(&sql), assignments.len() + predicates.len());

            let mut expected: Vec<Value> =
                assignments.iter().map(|(_, v)| v.clone()).collect();
            expected.extend(predicates.iter().map(|(_, _, v)| v.clone()));
            prop_assert_eq!(params, expected);
        }
    }

    // Additional validation tests

    /// Placeholder-free renderings are valid SQL per a generic parser.
    #[test]
    fn test_rendered_select_parses() {
        use sqlparser::dialect::GenericDialect;
        use sqlparser::parser::Parser;

        let query: SelectQuery = SelectQuery::new("users", detached_conn())
            .select(["id", "name"])
            .join(Join::new("orders").on("id", "=", "o.customer_id"))
            .order_by("name")
            .limit(10);

        let (sql, params) = query.build();
        assert!(params.is_empty());

        let statements =
            Parser::parse_sql(&GenericDialect {}, &sql).expect("rendered SQL should parse");
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_detached_build_is_pure() {
        // Rendering never touches the connection
        let query: SelectQuery = SelectQuery::new("t", detached_conn()).where_eq("a", 1i64);
        let (first_sql, first_params) = query.build();
        let (second_sql, second_params) = query.build();
        assert_eq!(first_sql, second_sql);
        assert_eq!(first_params, second_params);
    }
}
