// ==========================================
// QuoteApi 集成测试
// ==========================================
// 职责: 报价编号/版本、重复保存拦截、历史分组、载入重算、CSV 导出
// ==========================================


#[cfg(test)]
mod quote_api_test {
    use precision_quote::api::ApiError;
    use precision_quote::domain::{ComponentInput, Material, RateSettings, SaveQuoteInput};
    use precision_quote::logging;

    use crate::test_helpers::{count_rows, fixed_input, plate_input, save_input, setup_test_env};

    const EPS: f64 = 1e-6;

    // ==========================================
    // 报价编号与版本
    // ==========================================

    #[test]
    fn test_new_quotes_start_at_1001() {
        logging::init_test();
        let env = setup_test_env();

        let first = env.quote_api.save_quote(&save_input(0, "Die-A", 100.0), "estimator").unwrap();
        assert_eq!((first.quote_number, first.version), (1001, 1));

        let second = env.quote_api.save_quote(&save_input(0, "Die-B", 200.0), "estimator").unwrap();
        assert_eq!((second.quote_number, second.version), (1002, 1));
    }

    #[test]
    fn test_revisions_increment_version() {
        let env = setup_test_env();

        let first = env.quote_api.save_quote(&save_input(0, "Die-A", 100.0), "estimator").unwrap();
        for (total, expected_version) in [(110.0, 2), (120.0, 3), (130.0, 4)] {
            let saved = env
                .quote_api
                .save_quote(&save_input(first.quote_number, "Die-A", total), "estimator")
                .unwrap();
            assert_eq!(saved.quote_number, 1001);
            assert_eq!(saved.version, expected_version);
        }

        assert_eq!(count_rows(&env.conn, "quote"), 4);
    }

    #[test]
    fn test_tool_name_change_alone_is_a_revision() {
        let env = setup_test_env();

        env.quote_api.save_quote(&save_input(0, "Die-A", 500.0), "estimator").unwrap();
        let saved = env
            .quote_api
            .save_quote(&save_input(1001, "Die-A2", 500.0), "estimator")
            .unwrap();
        assert_eq!(saved.version, 2);
    }

    // ==========================================
    // 重复保存 / 不存在的报价号
    // ==========================================

    #[test]
    fn test_duplicate_within_tolerance_is_conflict() {
        let env = setup_test_env();

        env.quote_api.save_quote(&save_input(0, "Die-A", 1000.0), "estimator").unwrap();

        let err = env
            .quote_api
            .save_quote(&save_input(1001, "Die-A", 1000.004), "estimator")
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateRevision(_)), "{:?}", err);
        assert_eq!(err.status_code(), 409);

        // 拒绝时不写任何行
        assert_eq!(count_rows(&env.conn, "quote"), 1);
        assert_eq!(count_rows(&env.conn, "quote_item"), 1);

        let saved = env
            .quote_api
            .save_quote(&save_input(1001, "Die-A", 1000.02), "estimator")
            .unwrap();
        assert_eq!(saved.version, 2);
    }

    #[test]
    fn test_revision_of_unknown_quote_is_not_found() {
        let env = setup_test_env();

        let err = env
            .quote_api
            .save_quote(&save_input(4242, "Die-A", 10.0), "estimator")
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)), "{:?}", err);
        assert_eq!(err.status_code(), 404);
        assert_eq!(count_rows(&env.conn, "quote"), 0);
    }

    #[test]
    fn test_invalid_input_is_rejected_before_persistence() {
        let env = setup_test_env();

        let mut input = save_input(0, "Die-A", 10.0);
        input.items[0].component.shape = "Sphere".to_string();

        let err = env.quote_api.save_quote(&input, "estimator").unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(count_rows(&env.conn, "quote"), 0);
        assert_eq!(count_rows(&env.conn, "quote_item"), 0);

        let err = env
            .quote_api
            .save_quote(&save_input(0, "Die-A", 10.0), "   ")
            .unwrap_err();
        assert!(err.is_client_error());
    }

    // ==========================================
    // 计价与草稿
    // ==========================================

    #[test]
    fn test_price_components_uses_seeded_material_and_rates() {
        let env = setup_test_env();

        let priced = env
            .quote_api
            .price_components(&[plate_input("BOTTOM PLATE"), fixed_input("SPRING", 25.0)])
            .unwrap();

        let plate = &priced.components[0].breakdown;
        let weight = 200.0 * 150.0 * 40.0 * 0.000_007_85;
        let area = 88_000.0 / 645.16;
        assert!((plate.weight_kg - weight).abs() < EPS);
        assert!((plate.material_cost - weight * 350.0).abs() < EPS);
        assert!((plate.squaring_cost - area * 4.0).abs() < EPS);
        assert_eq!(plate.heat_treat_cost, 0.0);

        let spring = &priced.components[1].breakdown;
        assert_eq!(spring.grand_total, 25.0);
        assert!((priced.grand_total - (plate.grand_total + 25.0)).abs() < EPS);
    }

    #[test]
    fn test_unknown_material_falls_back_to_default_steel() {
        let env = setup_test_env();

        let input = ComponentInput {
            material_id: Some(999),
            ..plate_input("PUNCH HOLDER")
        };
        let breakdown = env.quote_api.compute_cost(&input).unwrap();

        assert!((breakdown.weight_kg - 9.42).abs() < EPS);
        assert_eq!(breakdown.material_cost, 0.0);
    }

    #[test]
    fn test_draft_then_save_uses_engine_totals() {
        let env = setup_test_env();

        let inputs = vec![plate_input("TOP PLATE"), fixed_input("BUSH", 12.5)];
        let request = env
            .quote_api
            .draft_save_request(0, "ACME Tooling", "Blanking Die", &inputs)
            .unwrap();

        let item_sum: f64 = request.items.iter().map(|i| i.final_cost).sum();
        assert!((request.grand_total - item_sum).abs() < EPS);

        let saved = env.quote_api.save_request(&request, "estimator").unwrap();
        let loaded = env.quote_api.load_quote(saved.quote_id).unwrap();
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(loaded.items[0].line_no, 1);
        assert_eq!(loaded.items[1].spec.component_name, "BUSH");
        assert!((loaded.header.total_cost - request.grand_total).abs() < EPS);
    }

    #[test]
    fn test_overflowing_dimensions_are_rejected() {
        let env = setup_test_env();

        // 单个尺寸有限，但体积乘积溢出为 inf
        let huge = ComponentInput {
            length_mm: 1e200,
            width_mm: 1e200,
            height_mm: 1e200,
            ..plate_input("DIE BLOCK")
        };

        let err = env.quote_api.compute_cost(&huge).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert_eq!(err.status_code(), 400);

        let err = env
            .quote_api
            .price_components(&[fixed_input("BUSH", 12.5), huge.clone()])
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(ref msg) if msg.contains("第2行")));

        let err = env
            .quote_api
            .draft_save_request(0, "ACME Tooling", "Blanking Die", &[huge])
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert_eq!(count_rows(&env.conn, "quote"), 0);
    }

    // ==========================================
    // 历史与载入
    // ==========================================

    #[test]
    fn test_quote_groups_latest_and_history() {
        let env = setup_test_env();

        env.quote_api.save_quote(&save_input(0, "Die-A", 100.0), "estimator").unwrap();
        env.quote_api.save_quote(&save_input(0, "Die-B", 200.0), "estimator").unwrap();
        env.quote_api.save_quote(&save_input(1001, "Die-A", 150.0), "estimator").unwrap();
        env.quote_api.save_quote(&save_input(1001, "Die-A", 175.0), "estimator").unwrap();

        let groups = env.quote_api.list_quote_groups().unwrap();
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].quote_number, 1002);
        assert_eq!(groups[0].latest.version, 1);
        assert!(groups[0].history.is_empty());

        assert_eq!(groups[1].quote_number, 1001);
        assert_eq!(groups[1].latest.version, 3);
        assert_eq!(groups[1].latest.total_cost, 175.0);
        let history: Vec<i32> = groups[1].history.iter().map(|q| q.version).collect();
        assert_eq!(history, vec![2, 1]);

        let group = env.quote_api.get_quote_group(1001).unwrap();
        assert_eq!(group.latest.version, 3);
        assert!(matches!(
            env.quote_api.get_quote_group(9999),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_recomputes_with_live_rates() {
        let env = setup_test_env();

        let input = SaveQuoteInput {
            quote_number: 0,
            customer_name: "ACME Tooling".to_string(),
            tool_name: "Die-A".to_string(),
            grand_total: 0.0,
            items: Vec::new(),
        };
        let component = ComponentInput {
            cnc_hours: 2.0,
            ..plate_input("DIE PLATE")
        };
        let request = env
            .quote_api
            .draft_save_request(input.quote_number, &input.customer_name, &input.tool_name, &[component])
            .unwrap();
        let saved = env.quote_api.save_request(&request, "estimator").unwrap();
        let frozen_total = request.grand_total;

        // 费率与材料价格上调
        env.catalog_api
            .update_rate_settings(&RateSettings {
                cnc_rate_hourly: 800.0,
                ..RateSettings::default()
            })
            .unwrap();
        env.material_repo
            .update(&Material {
                material_id: 1,
                name: "D2 (HCHCr)".to_string(),
                density_factor: 0.000_007_85,
                rate_per_kg: 400.0,
            })
            .unwrap();

        let loaded = env.quote_api.load_quote(saved.quote_id).unwrap();
        let breakdown = &loaded.breakdowns[0];

        assert!((breakdown.cnc_cost - 1600.0).abs() < EPS);
        assert!((breakdown.material_cost - 9.42 * 400.0).abs() < EPS);
        assert!(breakdown.grand_total > frozen_total);

        // 冻结值不变
        assert!((loaded.header.total_cost - frozen_total).abs() < EPS);
        assert!((loaded.items[0].final_cost - frozen_total).abs() < EPS);
    }

    #[test]
    fn test_load_unknown_quote_is_not_found() {
        let env = setup_test_env();
        let err = env.quote_api.load_quote(77).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    // ==========================================
    // CSV 导出
    // ==========================================

    #[test]
    fn test_export_quote_csv() {
        let env = setup_test_env();

        let request = env
            .quote_api
            .draft_save_request(
                0,
                "ACME Tooling",
                "Die-A",
                &[plate_input("TOP PLATE"), fixed_input("GUIDE PILLAR", 40.0)],
            )
            .unwrap();
        let saved = env.quote_api.save_request(&request, "estimator").unwrap();

        let mut buffer = Vec::new();
        env.quote_api.export_quote_csv(saved.quote_id, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("quote_number,version,line_no,component_name,shape"));
        assert!(lines[1].starts_with("1001,1,1,TOP PLATE,CUBOID"));
        assert!(lines[2].starts_with("1001,1,2,GUIDE PILLAR,FIXED"));
    }
}
