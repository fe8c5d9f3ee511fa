use crate::database::customer_repository::{CustomerInput, CustomerRepository, CustomerType};
use crate::database::error::DatabaseError;
use crate::database::payment_detail_repository::{NewPaymentDetail, PaymentDetailRepository};
use chrono::{DateTime, Utc};
use sqlx::{types::BigDecimal, FromRow, PgPool};

/// Transaction lifecycle. Reconciliation is one-way: pending rows move to
/// completed or failed and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }
}

/// Transaction entity
#[derive(Debug, Clone, FromRow)]
pub struct Transaction {
    pub id: i64,
    pub transaction_reference: String,
    pub invoice_number: String,
    pub original_invoice_number: Option<String>,
    pub customer_type: String,
    pub corporate_customer_id: Option<i64>,
    pub personal_customer_id: Option<i64>,
    pub others_reference: Option<String>,
    pub service_or_product: Option<String>,
    pub total_amount: BigDecimal,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new pending transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub transaction_reference: String,
    pub invoice_number: String,
    pub original_invoice_number: Option<String>,
    pub customer_type: CustomerType,
    pub others_reference: Option<String>,
    pub service_or_product: Option<String>,
    pub total_amount: BigDecimal,
}

/// Result of creating a transaction together with its customer upsert
#[derive(Debug, Clone)]
pub struct CreatedTransaction {
    pub transaction: Transaction,
    pub customer_id: i64,
}

/// Result of applying a gateway callback
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// Transactions matching the invoice, any status
    pub matched: i64,
    /// Rows moved out of pending by this callback
    pub transitioned: u64,
    /// Transaction the payment detail row was recorded against
    pub transaction_id: Option<i64>,
}

const TRANSACTION_COLUMNS: &str = "id, transaction_reference, invoice_number, \
     original_invoice_number, customer_type, corporate_customer_id, \
     personal_customer_id, others_reference, service_or_product, total_amount, \
     payment_status, created_at, updated_at";

/// Repository for payment transactions
#[derive(Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert the payer and insert one pending transaction as a single
    /// database transaction. Any failure rolls back both writes.
    pub async fn create_pending(
        &self,
        customer: &CustomerInput,
        new: &NewTransaction,
    ) -> Result<CreatedTransaction, DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let customer_id = CustomerRepository::upsert(&mut tx, customer).await?;

        let (corporate_id, personal_id) = match new.customer_type {
            CustomerType::Corporate => (Some(customer_id), None),
            CustomerType::Personal => (None, Some(customer_id)),
        };

        let transaction: Transaction = sqlx::query_as(&format!(
            "INSERT INTO transactions
             (transaction_reference, invoice_number, original_invoice_number,
              customer_type, corporate_customer_id, personal_customer_id,
              others_reference, service_or_product, total_amount, payment_status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending')
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(&new.transaction_reference)
        .bind(&new.invoice_number)
        .bind(&new.original_invoice_number)
        .bind(new.customer_type.as_str())
        .bind(corporate_id)
        .bind(personal_id)
        .bind(&new.others_reference)
        .bind(&new.service_or_product)
        .bind(&new.total_amount)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;

        Ok(CreatedTransaction {
            transaction,
            customer_id,
        })
    }

    /// Apply a gateway callback to the transactions matching an invoice
    /// number, as a single database transaction:
    ///
    /// 1. Count candidates by the invoice matching policy (exact match, or
    ///    the invoice followed by a `-` suffix added at creation time for
    ///    retry safety). Zero candidates commits nothing.
    /// 2. Move candidates still in `pending` to the new status. Zero rows
    ///    affected means the callback was redelivered after an earlier
    ///    delivery already reconciled the invoice; that is a no-op, not an
    ///    error.
    /// 3. Append one payment detail row against the most recently updated
    ///    candidate.
    ///
    /// Two concurrent callbacks for one invoice serialize on the row lock
    /// taken by the UPDATE; the loser sees `transitioned == 0`.
    pub async fn reconcile_by_invoice(
        &self,
        invoice_no: &str,
        new_status: PaymentStatus,
        detail: &NewPaymentDetail,
    ) -> Result<ReconcileOutcome, DatabaseError> {
        let pattern = format!("{invoice_no}-%");

        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let matched: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions
             WHERE invoice_number = $1 OR invoice_number LIKE $2",
        )
        .bind(invoice_no)
        .bind(&pattern)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        if matched == 0 {
            tx.rollback().await.map_err(DatabaseError::from_sqlx)?;
            return Ok(ReconcileOutcome {
                matched: 0,
                transitioned: 0,
                transaction_id: None,
            });
        }

        let transitioned = sqlx::query(
            "UPDATE transactions
             SET payment_status = $3, updated_at = NOW()
             WHERE (invoice_number = $1 OR invoice_number LIKE $2)
               AND payment_status = 'pending'",
        )
        .bind(invoice_no)
        .bind(&pattern)
        .bind(new_status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .rows_affected();

        let transaction_id: i64 = sqlx::query_scalar(
            "SELECT id FROM transactions
             WHERE invoice_number = $1 OR invoice_number LIKE $2
             ORDER BY updated_at DESC
             LIMIT 1",
        )
        .bind(invoice_no)
        .bind(&pattern)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        PaymentDetailRepository::insert(&mut tx, transaction_id, detail).await?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;

        Ok(ReconcileOutcome {
            matched,
            transitioned,
            transaction_id: Some(transaction_id),
        })
    }

    /// Find a transaction by its exact invoice number
    pub async fn find_by_invoice(
        &self,
        invoice_no: &str,
    ) -> Result<Option<Transaction>, DatabaseError> {
        sqlx::query_as(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions
             WHERE invoice_number = $1
             ORDER BY created_at DESC
             LIMIT 1"
        ))
        .bind(invoice_no)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    /// Latest transaction for an invoice joined with its most recent
    /// payment detail, for status inquiries
    pub async fn latest_with_detail(
        &self,
        invoice_no: &str,
    ) -> Result<Option<TransactionWithDetail>, DatabaseError> {
        sqlx::query_as(
            "SELECT t.id, t.transaction_reference, t.invoice_number, t.total_amount,
                    t.payment_status, t.updated_at,
                    pd.payment_reference, pd.payment_date, pd.amount_paid,
                    pd.gateway_response
             FROM transactions t
             LEFT JOIN payment_details pd ON pd.transaction_id = t.id
             WHERE t.invoice_number = $1
             ORDER BY pd.created_at DESC NULLS LAST
             LIMIT 1",
        )
        .bind(invoice_no)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }
}

/// Inquiry projection: transaction plus its most recent gateway attempt
#[derive(Debug, Clone, FromRow)]
pub struct TransactionWithDetail {
    pub id: i64,
    pub transaction_reference: String,
    pub invoice_number: String,
    pub total_amount: BigDecimal,
    pub payment_status: String,
    pub updated_at: DateTime<Utc>,
    pub payment_reference: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub amount_paid: Option<BigDecimal>,
    pub gateway_response: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_status_as_str_matches_schema_values() {
        assert_eq!(PaymentStatus::Pending.as_str(), "pending");
        assert_eq!(PaymentStatus::Completed.as_str(), "completed");
        assert_eq!(PaymentStatus::Failed.as_str(), "failed");
    }
}
