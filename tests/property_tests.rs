//! Property-based tests for connection string construction, result-mapping
//! invariants and status classification.
//!
//! These tests verify pure logic that needs no driver:
//! - Connection strings are well-formed for arbitrary inputs
//! - Row-wise collection keeps all column sequences the same length
//! - Status classification is total and agrees with the success predicate

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use std::collections::HashSet;

    use odbc_sys::SqlReturn;
    use odbql::config::Config;
    use odbql::core::db::{connection_string, ColumnarResult};
    use odbql::core::{succeeded, StatusKind};

    fn arb_identifier() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z0-9_.-]{0,19}".prop_map(|s: String| s)
    }

    fn arb_password() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_!#$%&*+-]{1,24}".prop_map(|s: String| s)
    }

    proptest! {
        /// The connection string always carries its five attributes in
        /// order, separated by semicolons, with a trailing semicolon.
        #[test]
        fn prop_connection_string_is_well_formed(
            server in arb_identifier(),
            port in any::<u16>(),
            database in arb_identifier(),
            username in arb_identifier(),
            password in arb_password(),
        ) {
            let conn_string =
                connection_string(&server, port, &database, &username, &password);

            prop_assert!(
                conn_string.starts_with("DRIVER={SQL Server};"),
                "connection string must start with the DRIVER prefix"
            );
            prop_assert!(conn_string.ends_with(';'));

            let segments: Vec<&str> = conn_string
                .trim_end_matches(';')
                .split(';')
                .collect();
            prop_assert_eq!(segments.len(), 5);
            let expected_server = format!("SERVER={}, {}", server, port);
            let expected_database = format!("DATABASE={}", database);
            let expected_username = format!("UID={}", username);
            let expected_password = format!("PWD={}", password);
            prop_assert_eq!(segments[1], expected_server.as_str());
            prop_assert_eq!(segments[2], expected_database.as_str());
            prop_assert_eq!(segments[3], expected_username.as_str());
            prop_assert_eq!(segments[4], expected_password.as_str());
        }

        /// Construction is deterministic.
        #[test]
        fn prop_connection_string_is_deterministic(
            server in arb_identifier(),
            port in any::<u16>(),
            database in arb_identifier(),
            username in arb_identifier(),
            password in arb_password(),
        ) {
            let first = connection_string(&server, port, &database, &username, &password);
            let second = connection_string(&server, port, &database, &username, &password);
            prop_assert_eq!(first, second);
        }

        /// Pushing cells row-wise over N distinct columns for M rows yields
        /// exactly N keys whose sequences all have M entries.
        #[test]
        fn prop_row_wise_collection_keeps_columns_aligned(
            names in prop::collection::hash_set(arb_identifier(), 1..8),
            rows in 0usize..32,
        ) {
            let names: Vec<String> = names.into_iter().collect();
            let mut result = ColumnarResult::new();
            for row in 0..rows {
                for name in &names {
                    result.push_cell(name, format!("{}", row));
                }
            }

            if rows == 0 {
                prop_assert!(result.is_empty());
            } else {
                prop_assert_eq!(result.column_count(), names.len());
                prop_assert_eq!(result.row_count(), rows);
                for (_, values) in result.iter() {
                    prop_assert_eq!(values.len(), rows);
                }
            }
        }

        /// Values arrive in fetch order within each column.
        #[test]
        fn prop_values_keep_fetch_order(rows in 1usize..64) {
            let mut result = ColumnarResult::new();
            for row in 0..rows {
                result.push_cell("n", row.to_string());
            }
            let values = result.get("n").expect("column must exist");
            let expected: Vec<String> = (0..rows).map(|r| r.to_string()).collect();
            prop_assert_eq!(values, expected.as_slice());
        }

        /// Classification is total over the raw status space and agrees
        /// with the success predicate.
        #[test]
        fn prop_status_classification_is_total(raw in any::<i16>()) {
            let status = SqlReturn(raw);
            let kind = StatusKind::of(status);
            let is_successful = matches!(
                kind,
                StatusKind::Success | StatusKind::SuccessWithInfo
            );
            prop_assert_eq!(is_successful, succeeded(status));
        }

        /// Configuration fields survive a TOML round trip.
        #[test]
        fn prop_config_round_trips_through_toml(
            server in arb_identifier(),
            port in any::<u16>(),
            database in arb_identifier(),
            username in arb_identifier(),
            password in "[a-zA-Z0-9_]{1,24}",
        ) {
            let text = format!(
                "[connection]\nserver = \"{}\"\nport = {}\ndatabase = \"{}\"\nusername = \"{}\"\npassword = \"{}\"\n",
                server, port, database, username, password
            );
            let config: Config = toml::from_str(&text).expect("generated config must parse");
            prop_assert_eq!(config.connection.server, server);
            prop_assert_eq!(config.connection.port, port);
            prop_assert_eq!(config.connection.database, database);
            prop_assert_eq!(config.connection.username, username);
            prop_assert_eq!(config.connection.password, password);
        }
    }

    #[test]
    fn distinct_names_stay_distinct() {
        let mut result = ColumnarResult::new();
        result.push_cell("a", "1".to_string());
        result.push_cell("b", "2".to_string());

        let names: HashSet<&str> = result.column_names().collect();
        assert_eq!(names.len(), 2);
    }
}
