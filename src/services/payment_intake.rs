use crate::database::customer_repository::{
    CorporateCustomerInput, CustomerInput, CustomerType, PersonalCustomerInput,
};
use crate::database::transaction_repository::{NewTransaction, TransactionRepository};
use crate::error::{AppError, AppErrorKind, AppResult, ValidationError};
use bigdecimal::{BigDecimal, RoundingMode};
use chrono::Utc;
use serde::Deserialize;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

/// Inbound payment request, as posted by the intake form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentRequestForm {
    pub invoice_number: Option<String>,
    pub original_invoice_number: Option<String>,
    pub total_amount: Option<String>,
    pub customer_type: Option<CustomerType>,
    pub company_name: Option<String>,
    pub tax_id: Option<String>,
    pub member_code: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub contact_person_name: Option<String>,
    pub contact_first_name: Option<String>,
    pub contact_last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub others_reference: Option<String>,
    pub service_or_product: Option<String>,
}

/// Identifiers returned for a freshly recorded payment request
#[derive(Debug, Clone)]
pub struct PaymentCreated {
    pub transaction_id: i64,
    pub transaction_reference: String,
    pub customer_id: i64,
}

/// Records payment requests: validates the form, normalizes the amount and
/// persists customer + pending transaction as one atomic unit.
#[derive(Clone)]
pub struct PaymentIntakeService {
    transactions: TransactionRepository,
}

impl PaymentIntakeService {
    pub fn new(transactions: TransactionRepository) -> Self {
        Self { transactions }
    }

    pub async fn create_payment(&self, form: PaymentRequestForm) -> AppResult<PaymentCreated> {
        let invoice_number = require_field(form.invoice_number.as_deref(), "invoice_number")?;
        let raw_amount = require_field(form.total_amount.as_deref(), "total_amount")?;
        let total_amount = normalize_amount(&raw_amount)?;

        // Anything that does not say corporate is stored as personal
        let customer_type = form.customer_type.unwrap_or(CustomerType::Personal);

        let customer = match customer_type {
            CustomerType::Corporate => CustomerInput::Corporate(CorporateCustomerInput {
                company_name: form.company_name,
                tax_id: form.tax_id,
                member_code: form.member_code,
                first_name: form.first_name,
                last_name: form.last_name,
                contact_person_name: form.contact_person_name,
                phone: form.phone,
                email: form.email,
                address: form.address,
            }),
            CustomerType::Personal => CustomerInput::Personal(PersonalCustomerInput {
                first_name: form.first_name,
                last_name: form.last_name,
                tax_id: form.tax_id,
                member_code: form.member_code,
                contact_first_name: form.contact_first_name,
                contact_last_name: form.contact_last_name,
                phone: form.phone,
                email: form.email,
                address: form.address,
            }),
        };

        let new_transaction = NewTransaction {
            transaction_reference: generate_transaction_reference(),
            invoice_number,
            original_invoice_number: form.original_invoice_number,
            customer_type,
            others_reference: form.others_reference,
            service_or_product: form.service_or_product,
            total_amount,
        };

        let created = self
            .transactions
            .create_pending(&customer, &new_transaction)
            .await?;

        info!(
            transaction_id = created.transaction.id,
            transaction_reference = %created.transaction.transaction_reference,
            customer_id = created.customer_id,
            invoice_no = %created.transaction.invoice_number,
            "payment request recorded as pending"
        );

        Ok(PaymentCreated {
            transaction_id: created.transaction.id,
            transaction_reference: created.transaction.transaction_reference,
            customer_id: created.customer_id,
        })
    }
}

fn require_field(value: Option<&str>, field: &str) -> AppResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(AppError::missing_field(field)),
    }
}

/// Parse a caller-supplied amount and normalize it to two decimal places,
/// rounding half-up. Rejects non-numeric and negative values.
pub fn normalize_amount(raw: &str) -> AppResult<BigDecimal> {
    let parsed = BigDecimal::from_str(raw.trim()).map_err(|_| {
        AppError::new(AppErrorKind::Validation(ValidationError::InvalidAmount {
            amount: raw.to_string(),
            reason: "must be a number".to_string(),
        }))
    })?;

    if parsed < BigDecimal::from(0) {
        return Err(AppError::new(AppErrorKind::Validation(
            ValidationError::InvalidAmount {
                amount: raw.to_string(),
                reason: "must not be negative".to_string(),
            },
        )));
    }

    Ok(parsed.with_scale_round(2, RoundingMode::HalfUp))
}

/// Generate a transaction reference: timestamp plus a short random suffix.
/// Not globally unique by construction, but collisions are negligible at
/// the expected volume and the column's unique index backstops them.
pub fn generate_transaction_reference() -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("TXN-{}-{}", Utc::now().timestamp_millis(), suffix)
}
