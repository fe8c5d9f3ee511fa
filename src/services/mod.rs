//! Services module for business logic

pub mod callback_reconciler;
pub mod inquiry;
pub mod payment_intake;

#[cfg(test)]
mod callback_reconciler_tests;

pub use crate::services::callback_reconciler::{CallbackReconciler, ReconcilerError};
pub use crate::services::inquiry::InquiryService;
pub use crate::services::payment_intake::PaymentIntakeService;
