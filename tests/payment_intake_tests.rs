#[cfg(test)]
mod payment_intake_tests {
    use bigdecimal::BigDecimal;
    use epay_backend::services::payment_intake::{
        generate_transaction_reference, normalize_amount,
    };
    use std::str::FromStr;

    #[test]
    fn test_amount_rounding_is_pinned_to_half_up() {
        // "100.005" must store as 100.01, not truncate to 100.00
        assert_eq!(
            normalize_amount("100.005").unwrap(),
            BigDecimal::from_str("100.01").unwrap()
        );
        assert_eq!(
            normalize_amount("0.005").unwrap(),
            BigDecimal::from_str("0.01").unwrap()
        );
        assert_eq!(
            normalize_amount("99.994").unwrap(),
            BigDecimal::from_str("99.99").unwrap()
        );
    }

    #[test]
    fn test_amount_validation_rejects_bad_input_before_any_write() {
        for bad in ["-0.01", "-100", "abc", "1e", "", "  "] {
            assert!(normalize_amount(bad).is_err(), "should reject {:?}", bad);
        }
    }

    #[test]
    fn test_references_are_distinct_across_calls() {
        let a = generate_transaction_reference();
        let b = generate_transaction_reference();
        assert_ne!(a, b);
        assert!(a.starts_with("TXN-"));
        assert!(b.starts_with("TXN-"));
    }

    #[tokio::test]
    #[ignore] // Requires database running
    async fn test_create_payment_persists_pending_transaction() {
        use epay_backend::database::transaction_repository::TransactionRepository;
        use epay_backend::services::payment_intake::{PaymentIntakeService, PaymentRequestForm};

        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = epay_backend::database::init_pool(&url, None)
            .await
            .expect("pool init should succeed");
        epay_backend::database::run_migrations(&pool)
            .await
            .expect("migrations should run");

        let repo = TransactionRepository::new(pool);
        let intake = PaymentIntakeService::new(repo.clone());

        let invoice = format!("IT-INTAKE-{}", chrono::Utc::now().timestamp_millis());
        let created = intake
            .create_payment(PaymentRequestForm {
                invoice_number: Some(invoice.clone()),
                total_amount: Some("250".to_string()),
                tax_id: Some(format!("TAX-{}", invoice)),
                first_name: Some("Somchai".to_string()),
                ..Default::default()
            })
            .await
            .expect("intake should succeed");

        let stored = repo
            .find_by_invoice(&invoice)
            .await
            .unwrap()
            .expect("transaction should be stored");
        assert_eq!(stored.id, created.transaction_id);
        assert_eq!(stored.payment_status, "pending");
        assert_eq!(
            stored.total_amount,
            BigDecimal::from_str("250.00").unwrap()
        );
        assert_eq!(stored.personal_customer_id, Some(created.customer_id));
    }

    #[tokio::test]
    #[ignore] // Requires database running
    async fn test_same_tax_id_upserts_one_customer_row() {
        use epay_backend::database::transaction_repository::TransactionRepository;
        use epay_backend::services::payment_intake::{PaymentIntakeService, PaymentRequestForm};

        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = epay_backend::database::init_pool(&url, None)
            .await
            .expect("pool init should succeed");
        epay_backend::database::run_migrations(&pool)
            .await
            .expect("migrations should run");

        let repo = TransactionRepository::new(pool);
        let intake = PaymentIntakeService::new(repo);

        let tax_id = format!("TAX-UPSERT-{}", chrono::Utc::now().timestamp_millis());
        let form = |invoice: String| PaymentRequestForm {
            invoice_number: Some(invoice),
            total_amount: Some("10".to_string()),
            tax_id: Some(tax_id.clone()),
            ..Default::default()
        };

        let first = intake
            .create_payment(form(format!("IT-UP-A-{}", tax_id)))
            .await
            .unwrap();
        let second = intake
            .create_payment(form(format!("IT-UP-B-{}", tax_id)))
            .await
            .unwrap();

        // Both transactions must point at the same upserted customer
        assert_eq!(first.customer_id, second.customer_id);
        assert_ne!(first.transaction_id, second.transaction_id);
    }
}
