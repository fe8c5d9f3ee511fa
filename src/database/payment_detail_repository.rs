use crate::database::error::DatabaseError;
use chrono::{DateTime, Utc};
use sqlx::types::BigDecimal;
use sqlx::PgConnection;

/// One reconciliation event to be appended against a transaction
#[derive(Debug, Clone)]
pub struct NewPaymentDetail {
    pub payment_method: String,
    pub payment_reference: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub amount_paid: Option<BigDecimal>,
    pub payment_status: String,
    pub gateway_response: serde_json::Value,
}

/// Repository for the append-only payment detail audit trail.
///
/// Inserts run on the caller's connection, inside the reconciliation
/// transaction.
pub struct PaymentDetailRepository;

impl PaymentDetailRepository {
    pub async fn insert(
        conn: &mut PgConnection,
        transaction_id: i64,
        detail: &NewPaymentDetail,
    ) -> Result<i64, DatabaseError> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO payment_details
             (transaction_id, payment_method, payment_reference, payment_date,
              amount_paid, payment_status, gateway_response)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(transaction_id)
        .bind(&detail.payment_method)
        .bind(&detail.payment_reference)
        .bind(detail.payment_date)
        .bind(&detail.amount_paid)
        .bind(&detail.payment_status)
        .bind(&detail.gateway_response)
        .fetch_one(conn)
        .await
        .map_err(DatabaseError::from_sqlx)
    }
}
