// ==========================================
// 报价仓储集成测试
// ==========================================
// 职责: 验证事务内编号判定、明细快照、唯一约束与只追加语义
// ==========================================


#[cfg(test)]
mod quote_repository_test {
    use chrono::NaiveDate;
    use precision_quote::api::{validate_save_input, ApiError};
    use precision_quote::domain::{SaveQuoteRequest, ShapeKind};
    use precision_quote::engine::RevisionRejection;
    use precision_quote::repository::{QuoteRepository, RepositoryError, SaveOutcome};

    use crate::test_helpers::{
        count_rows, create_test_db, open_test_connection, save_input, setup_test_env,
    };

    fn request(quote_number: i64, tool_name: &str, total: f64) -> SaveQuoteRequest {
        validate_save_input(&save_input(quote_number, tool_name, total), "estimator").unwrap()
    }

    fn created_at() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn saved(outcome: SaveOutcome) -> precision_quote::domain::SavedRevision {
        match outcome {
            SaveOutcome::Saved(saved) => saved,
            SaveOutcome::Rejected(r) => panic!("unexpected rejection: {:?}", r),
        }
    }

    #[test]
    fn test_save_and_read_back_snapshot() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let conn = open_test_connection(&db_path);
        let repo = QuoteRepository::new(conn.clone());

        let first = saved(repo.save_revision(&request(0, "Die-A", 80.0), "estimator", created_at()).unwrap());
        assert_eq!((first.quote_number, first.version), (1001, 1));

        let header = repo.find_by_id(first.quote_id).unwrap().unwrap();
        assert_eq!(header.customer_name, "ACME Tooling");
        assert_eq!(header.created_by, "estimator");
        assert_eq!(header.created_at, created_at());

        let items = repo.find_items(first.quote_id).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].line_no, 1);
        assert_eq!(items[0].spec.shape, ShapeKind::Fixed);
        assert_eq!(items[0].spec.quantity, 1);
        assert_eq!(items[0].final_cost, 80.0);

        let latest = repo.find_latest_revision(1001).unwrap().unwrap();
        assert_eq!(latest.version, 1);
        assert_eq!(latest.tool_name, "Die-A");
        assert!(repo.find_latest_revision(1002).unwrap().is_none());
    }

    #[test]
    fn test_rejections_write_nothing() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let conn = open_test_connection(&db_path);
        let repo = QuoteRepository::new(conn.clone());

        saved(repo.save_revision(&request(0, "Die-A", 80.0), "estimator", created_at()).unwrap());

        let outcome = repo
            .save_revision(&request(1001, "Die-A", 80.001), "estimator", created_at())
            .unwrap();
        assert_eq!(
            outcome,
            SaveOutcome::Rejected(RevisionRejection::Duplicate {
                quote_number: 1001,
                version: 1
            })
        );

        let outcome = repo
            .save_revision(&request(2000, "Die-A", 80.0), "estimator", created_at())
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Rejected(RevisionRejection::QuoteNotFound(2000)));

        assert_eq!(count_rows(&conn, "quote"), 1);
        assert_eq!(count_rows(&conn, "quote_item"), 1);
    }

    #[test]
    fn test_unique_quote_version_constraint() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let conn = open_test_connection(&db_path);

        let guard = conn.lock().unwrap();
        let insert = "INSERT INTO quote (quote_number, version, customer_name, tool_name, total_cost, created_by, created_at)
                      VALUES (1001, 1, 'ACME', 'Die-A', 1.0, 'estimator', '2024-03-01 09:30:00')";
        guard.execute(insert, []).unwrap();
        let err: RepositoryError = guard.execute(insert, []).unwrap_err().into();
        assert!(err.is_unique_violation(), "{:?}", err);
    }

    #[test]
    fn test_list_all_and_find_by_quote_number() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let conn = open_test_connection(&db_path);
        let repo = QuoteRepository::new(conn);

        saved(repo.save_revision(&request(0, "Die-A", 10.0), "estimator", created_at()).unwrap());
        saved(repo.save_revision(&request(1001, "Die-A", 20.0), "estimator", created_at()).unwrap());
        saved(repo.save_revision(&request(0, "Die-B", 30.0), "estimator", created_at()).unwrap());

        let all: Vec<(i64, i32)> = repo
            .list_all()
            .unwrap()
            .iter()
            .map(|q| (q.quote_number, q.version))
            .collect();
        assert_eq!(all, vec![(1002, 1), (1001, 2), (1001, 1)]);

        let versions: Vec<i32> = repo
            .find_by_quote_number(1001)
            .unwrap()
            .iter()
            .map(|q| q.version)
            .collect();
        assert_eq!(versions, vec![2, 1]);
    }

    #[test]
    fn test_failed_item_insert_rolls_back_header() {
        let env = setup_test_env();

        // 明细写入失败时表头也不能留下
        env.conn
            .lock()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER fail_item_insert BEFORE INSERT ON quote_item
                 BEGIN SELECT RAISE(ABORT, 'item insert failed'); END;",
            )
            .unwrap();

        let err = env
            .quote_api
            .save_quote(&save_input(0, "Die-A", 10.0), "estimator")
            .unwrap_err();

        assert!(matches!(err, ApiError::PersistenceFailure(_)));
        assert_eq!(err.status_code(), 500);
        assert_eq!(count_rows(&env.conn, "quote"), 0);
        assert_eq!(count_rows(&env.conn, "quote_item"), 0);

        // 故障排除后同一请求可正常保存
        env.conn
            .lock()
            .unwrap()
            .execute_batch("DROP TRIGGER fail_item_insert;")
            .unwrap();
        let saved = env
            .quote_api
            .save_quote(&save_input(0, "Die-A", 10.0), "estimator")
            .unwrap();
        assert_eq!(saved.quote_number, 1001);
        assert_eq!(count_rows(&env.conn, "quote_item"), 1);
    }
}
