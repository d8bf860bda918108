#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::{TempDir, tempdir};

    use crate::catalog::Catalog;
    use crate::catalog::info::DbInfo;
    use crate::engine::Database;
    use crate::error::{Error, ErrorKind};
    use crate::script::QueryResult;
    use crate::storage::TableStore;

    const CREATE_USERS: &str = "CREATE_TABLE users ( NUMBER id KEY NOTNULL, TEXT name NOTNULL );";

    fn setup() -> (TempDir, Database) {
        let dir = tempdir().unwrap();
        let catalog = Catalog::create_database(dir.path(), DbInfo::new("testdb", 8080)).unwrap();
        (dir, Database::open(catalog))
    }

    fn with_users() -> (TempDir, Database) {
        let (dir, mut db) = setup();
        db.run(CREATE_USERS).unwrap();
        (dir, db)
    }

    fn table_file(db: &Database, name: &str) -> String {
        fs::read_to_string(db.catalog.tables_dir().join(format!("{}.tff", name))).unwrap()
    }

    fn message(result: QueryResult) -> String {
        match result {
            QueryResult::Message(msg) => msg,
            other => panic!("expected a message, got {:?}", other),
        }
    }

    #[test]
    fn test_users_lifecycle() {
        let (_dir, mut db) = setup();

        let msg = message(db.run(CREATE_USERS).unwrap());
        assert_eq!(msg, "Table 'users' created successfully");

        let msg = message(db.run(r#"ADD users ( 1, "Alice" );"#).unwrap());
        assert_eq!(msg, "Data successfully added to table 'users'");

        let QueryResult::Row(row) = db.run("GET users 1 ;").unwrap() else {
            panic!("GET should return a row");
        };
        assert_eq!(row.get("id"), Some("1"));
        assert_eq!(row.get("name"), Some("Alice"));

        let msg = message(db.run(r#"UPDATE users 1 ( 1, "Bob" );"#).unwrap());
        assert_eq!(msg, "Table 'users' updated successfully");

        let QueryResult::Row(row) = db.run("GET users 1 ;").unwrap() else {
            panic!("GET should return a row");
        };
        assert_eq!(
            row.fields,
            vec![
                ("id".to_string(), "1".to_string()),
                ("name".to_string(), "Bob".to_string())
            ]
        );

        let msg = message(db.run("DELETE users 1 ;").unwrap());
        assert_eq!(msg, "Row with key '1' successfully deleted from table 'users'");

        let err = db.run("GET users 1 ;").unwrap_err();
        assert!(matches!(err, Error::KeyNotFound(ref k) if k == "1"));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_create_writes_empty_table_file() {
        let (_dir, db) = with_users();
        assert_eq!(
            table_file(&db, "users"),
            "Title : \"users\"\n\nTABLE_S BEGIN\n    NUMBER id NOTNULL KEY,\n    TEXT name NOTNULL\nEND\n\nDATA_SECTION :\n"
        );
    }

    #[test]
    fn test_duplicate_add_leaves_file_unchanged() {
        let (_dir, mut db) = with_users();
        db.run(r#"ADD users ( 1, "Alice" );"#).unwrap();
        let before = table_file(&db, "users");

        let err = db.run(r#"ADD users ( 1, "Alice" );"#).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(ref k) if k == "1"));
        assert_eq!(table_file(&db, "users"), before);
    }

    #[test]
    fn test_create_table_failures() {
        let (_dir, mut db) = with_users();

        assert!(matches!(db.run(CREATE_USERS), Err(Error::TableExists(_))));

        let cases = [
            "CREATE_TABLE t ( );",
            "CREATE_TABLE t ( NUMBER id NOTNULL, TEXT name );",
            "CREATE_TABLE t ( NUMBER id KEY NOTNULL, TEXT name KEY NOTNULL );",
            "CREATE_TABLE t ( NUMBER id KEY, TEXT name NOTNULL );",
        ];
        for stmt in cases {
            let err = db.run(stmt).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Schema, "{}", stmt);
        }
        assert!(!db.catalog.tables_dir().join("t.tff").exists());
    }

    #[test]
    fn test_create_table_check_order() {
        let (_dir, mut db) = setup();
        // Two KEY columns without NOTNULL report the key count first.
        let err = db
            .run("CREATE_TABLE t ( NUMBER a KEY, NUMBER b KEY );")
            .unwrap_err();
        assert_eq!(err.to_string(), "only one KEY column is allowed per table");

        let err = db.run("CREATE_TABLE t ( NUMBER a KEY );").unwrap_err();
        assert_eq!(err.to_string(), "KEY column cannot allow NULL values");
    }

    #[test]
    fn test_add_failures() {
        let (_dir, mut db) = with_users();
        db.run(r#"ADD users ( 1, "Alice" );"#).unwrap();
        let before = table_file(&db, "users");

        assert!(matches!(
            db.run(r#"ADD ghosts ( 1, "x" );"#),
            Err(Error::TableNotFound(ref t)) if t == "ghosts"
        ));
        assert!(matches!(
            db.run("ADD users ( 2 );"),
            Err(Error::ValueCount {
                expected: 2,
                received: 1
            })
        ));
        assert!(matches!(
            db.run(r#"ADD users ( 2, "" );"#),
            Err(Error::Validation(ref m)) if m == "column 'name' cannot be NULL"
        ));
        assert!(matches!(
            db.run(r#"ADD users ( "two", "Bob" );"#),
            Err(Error::Validation(ref m)) if m.starts_with("invalid number format for column 'id'")
        ));
        assert!(matches!(
            db.run("ADD users ( );"),
            Err(Error::Validation(ref m)) if m == "no data provided"
        ));

        assert_eq!(table_file(&db, "users"), before);
    }

    #[test]
    fn test_value_count_checked_before_types() {
        let (_dir, mut db) = with_users();
        assert!(matches!(
            db.run(r#"ADD users ( "x", "y", "z" );"#),
            Err(Error::ValueCount { .. })
        ));
    }

    #[test]
    fn test_missing_table_or_key() {
        let (_dir, mut db) = with_users();
        db.run(r#"ADD users ( 1, "Alice" );"#).unwrap();

        for stmt in [
            r#"UPDATE ghosts 1 ( 1, "x" );"#,
            "GET ghosts 1 ;",
            "DELETE ghosts 1 ;",
        ] {
            assert!(matches!(db.run(stmt), Err(Error::TableNotFound(_))), "{}", stmt);
        }
        for stmt in [
            r#"UPDATE users 9 ( 9, "x" );"#,
            "GET users 9 ;",
            "DELETE users 9 ;",
        ] {
            assert!(matches!(db.run(stmt), Err(Error::KeyNotFound(_))), "{}", stmt);
        }
    }

    #[test]
    fn test_update_validates_values() {
        let (_dir, mut db) = with_users();
        db.run(r#"ADD users ( 1, "Alice" );"#).unwrap();
        let before = table_file(&db, "users");

        assert!(matches!(
            db.run("UPDATE users 1 ( );"),
            Err(Error::Validation(ref m)) if m == "no update data provided"
        ));
        assert!(matches!(
            db.run(r#"UPDATE users 1 ( "Bob" );"#),
            Err(Error::ValueCount { .. })
        ));
        assert!(matches!(
            db.run(r#"UPDATE users 1 ( "", "Bob" );"#),
            Err(Error::Validation(_))
        ));
        assert_eq!(table_file(&db, "users"), before);
    }

    #[test]
    fn test_get_is_side_effect_free() {
        let (_dir, mut db) = with_users();
        db.run(r#"ADD users ( 1, "Alice" );"#).unwrap();
        let before = table_file(&db, "users");

        db.run("GET users 1 ;").unwrap();
        let _ = db.run("GET users 2 ;");
        assert_eq!(table_file(&db, "users"), before);
    }

    #[test]
    fn test_delete_preserves_order() {
        let (_dir, mut db) = with_users();
        for (id, name) in [(1, "a"), (2, "b"), (3, "c"), (4, "d")] {
            db.run(&format!("ADD users ( {}, \"{}\" );", id, name)).unwrap();
        }
        db.run("DELETE users 2 ;").unwrap();

        let table = db.store().load("users").unwrap();
        let keys: Vec<_> = table.rows().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["1", "3", "4"]);
    }

    #[test]
    fn test_update_of_key_column_is_resynced_on_reload() {
        // The in-memory row keeps its old key after UPDATE, but each
        // statement re-reads the file and the key is taken from the key
        // column again.
        let (_dir, mut db) = with_users();
        db.run(r#"ADD users ( 1, "Alice" );"#).unwrap();
        db.run(r#"UPDATE users 1 ( 7, "Alice" );"#).unwrap();

        assert!(matches!(db.run("GET users 1 ;"), Err(Error::KeyNotFound(_))));
        let QueryResult::Row(row) = db.run("GET users 7 ;").unwrap() else {
            panic!("GET should return a row");
        };
        assert_eq!(row.get("id"), Some("7"));
    }

    #[test]
    fn test_string_keys() {
        let (_dir, mut db) = setup();
        db.run("CREATE_TABLE items ( TEXT sku NOTNULL KEY, NUMBER qty );")
            .unwrap();
        db.run(r#"ADD items ( "a-1", 5 );"#).unwrap();
        db.run(r#"ADD items ( "b-2", "" );"#).unwrap();

        let QueryResult::Row(row) = db.run(r#"GET items "b-2" ;"#).unwrap() else {
            panic!("GET should return a row");
        };
        assert_eq!(row.get("qty"), Some(""));
        assert_eq!(
            row.to_string(),
            "Data for key 'b-2' in table 'items':\n  sku: b-2\n  qty: "
        );
    }

    #[test]
    fn test_statement_errors_precede_execution() {
        let (_dir, mut db) = setup();
        assert!(matches!(db.run("SELECT * FROM t;"), Err(Error::Syntax(_))));
        assert!(matches!(db.run(";"), Err(Error::UnknownCommand)));
        assert!(matches!(db.run("GET users 1"), Err(Error::Syntax(_))));
        assert!(db.catalog.table_names().unwrap().is_empty());
    }

    #[test]
    fn test_schema_round_trip_through_store() {
        let (_dir, mut db) = setup();
        db.run("CREATE_TABLE people ( TEXT email NOTNULL KEY, NUMBER age, TEXT bio );")
            .unwrap();
        let table = db.store().load("people").unwrap();
        let columns: Vec<_> = table
            .schema
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.column_type.to_string(), c.is_key, c.not_null))
            .collect();
        assert_eq!(
            columns,
            vec![
                ("email", "TEXT".to_string(), true, true),
                ("age", "NUMBER".to_string(), false, false),
                ("bio", "TEXT".to_string(), false, false),
            ]
        );
    }

    #[test]
    fn test_quotes_and_commas_in_text_survive_reload() {
        let (_dir, mut db) = setup();
        db.run("CREATE_TABLE t ( NUMBER id KEY NOTNULL, TEXT a NOTNULL, TEXT b NOTNULL );")
            .unwrap();
        db.run(r#"ADD t ( 1, "say \"hi", "x" );"#).unwrap();
        db.run(r#"ADD t ( 2, "a, \"b\", c", "\\" );"#).unwrap();

        let QueryResult::Row(row) = db.run("GET t 1 ;").unwrap() else {
            panic!("GET should return a row");
        };
        assert_eq!(row.get("a"), Some(r#"say \"hi"#));
        assert_eq!(row.get("b"), Some("x"));

        let QueryResult::Row(row) = db.run("GET t 2 ;").unwrap() else {
            panic!("GET should return a row");
        };
        assert_eq!(row.get("a"), Some(r#"a, \"b\", c"#));
        assert_eq!(row.get("b"), Some(r#"\\"#));

        db.run(r#"UPDATE t 1 ( 1, "x, \"y", "z" );"#).unwrap();
        let QueryResult::Row(row) = db.run("GET t 1 ;").unwrap() else {
            panic!("GET should return a row");
        };
        assert_eq!(row.get("a"), Some(r#"x, \"y"#));
        assert_eq!(row.get("b"), Some("z"));
    }

    #[test]
    fn test_line_break_in_text_is_kept() {
        let (_dir, mut db) = with_users();
        db.run("ADD users ( 1, \"line1\nline2\" );").unwrap();

        let QueryResult::Row(row) = db.run("GET users 1 ;").unwrap() else {
            panic!("GET should return a row");
        };
        assert_eq!(row.get("name"), Some("line1\nline2"));
        assert!(matches!(
            db.run(r#"ADD users ( 1, "again" );"#),
            Err(Error::DuplicateKey(_))
        ));
        assert_eq!(table_file(&db, "users").lines().count(), 9);
    }

    #[test]
    fn test_edge_whitespace_in_text_is_kept() {
        let (_dir, mut db) = with_users();
        db.run(r#"ADD users ( 1, " Alice " );"#).unwrap();

        let QueryResult::Row(row) = db.run("GET users 1 ;").unwrap() else {
            panic!("GET should return a row");
        };
        assert_eq!(row.get("name"), Some(" Alice "));
    }
}
