use crate::database::error::DatabaseError;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

/// Payer variant. Anything that is not corporate is treated as personal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    Corporate,
    Personal,
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::Corporate => "corporate",
            CustomerType::Personal => "personal",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorporateCustomerInput {
    pub company_name: Option<String>,
    pub tax_id: Option<String>,
    pub member_code: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub contact_person_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PersonalCustomerInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub tax_id: Option<String>,
    pub member_code: Option<String>,
    pub contact_first_name: Option<String>,
    pub contact_last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone)]
pub enum CustomerInput {
    Corporate(CorporateCustomerInput),
    Personal(PersonalCustomerInput),
}

impl CustomerInput {
    pub fn customer_type(&self) -> CustomerType {
        match self {
            CustomerInput::Corporate(_) => CustomerType::Corporate,
            CustomerInput::Personal(_) => CustomerType::Personal,
        }
    }
}

/// Repository for payer records.
///
/// Upserts run on the caller's database connection so they commit or roll
/// back together with the transaction insert that follows them.
pub struct CustomerRepository;

impl CustomerRepository {
    /// Insert or update a corporate customer keyed by tax id, returning its id
    pub async fn upsert_corporate(
        conn: &mut PgConnection,
        input: &CorporateCustomerInput,
    ) -> Result<i64, DatabaseError> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO corporate_customers
             (company_name, tax_id, member_code, first_name, last_name,
              contact_person_name, phone, email, address)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (tax_id) DO UPDATE SET
                 company_name = EXCLUDED.company_name,
                 member_code = EXCLUDED.member_code,
                 first_name = EXCLUDED.first_name,
                 last_name = EXCLUDED.last_name,
                 contact_person_name = EXCLUDED.contact_person_name,
                 phone = EXCLUDED.phone,
                 email = EXCLUDED.email,
                 address = EXCLUDED.address,
                 updated_at = NOW()
             RETURNING id",
        )
        .bind(&input.company_name)
        .bind(&input.tax_id)
        .bind(&input.member_code)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.contact_person_name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_one(conn)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    /// Insert or update a personal customer keyed by tax id, returning its id
    pub async fn upsert_personal(
        conn: &mut PgConnection,
        input: &PersonalCustomerInput,
    ) -> Result<i64, DatabaseError> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO personal_customers
             (first_name, last_name, tax_id, member_code, contact_first_name,
              contact_last_name, phone, email, address)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (tax_id) DO UPDATE SET
                 first_name = EXCLUDED.first_name,
                 last_name = EXCLUDED.last_name,
                 member_code = EXCLUDED.member_code,
                 contact_first_name = EXCLUDED.contact_first_name,
                 contact_last_name = EXCLUDED.contact_last_name,
                 phone = EXCLUDED.phone,
                 email = EXCLUDED.email,
                 address = EXCLUDED.address,
                 updated_at = NOW()
             RETURNING id",
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.tax_id)
        .bind(&input.member_code)
        .bind(&input.contact_first_name)
        .bind(&input.contact_last_name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_one(conn)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    /// Upsert whichever variant the input carries
    pub async fn upsert(
        conn: &mut PgConnection,
        input: &CustomerInput,
    ) -> Result<i64, DatabaseError> {
        match input {
            CustomerInput::Corporate(c) => Self::upsert_corporate(conn, c).await,
            CustomerInput::Personal(p) => Self::upsert_personal(conn, p).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_type_round_trips_through_serde() {
        let parsed: CustomerType = serde_json::from_str("\"corporate\"").unwrap();
        assert_eq!(parsed, CustomerType::Corporate);
        assert_eq!(parsed.as_str(), "corporate");

        let parsed: CustomerType = serde_json::from_str("\"personal\"").unwrap();
        assert_eq!(parsed.as_str(), "personal");
    }

    #[test]
    fn customer_input_reports_its_variant() {
        let input = CustomerInput::Corporate(CorporateCustomerInput::default());
        assert_eq!(input.customer_type(), CustomerType::Corporate);

        let input = CustomerInput::Personal(PersonalCustomerInput::default());
        assert_eq!(input.customer_type(), CustomerType::Personal);
    }
}
