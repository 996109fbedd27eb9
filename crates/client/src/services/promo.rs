//! Promo-validation collaborator trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::Money;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Validation request sent to the promo collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoRequest {
    pub code: String,
    pub booking_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

/// Validation outcome from the promo collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoValidation {
    pub is_valid: bool,
    pub code: String,
    pub discount_amount: Money,
    pub message: String,
}

/// Trait for promo-code validation.
#[async_trait]
pub trait PromoValidator: Send + Sync {
    /// Validates a promo code against the current booking amount.
    async fn validate(&self, request: PromoRequest) -> Result<PromoValidation, ClientError>;
}

#[derive(Debug, Default)]
struct InMemoryPromoState {
    codes: HashMap<String, (Money, String)>,
    fail_on_validate: bool,
}

/// In-memory promo validator for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPromoApi {
    state: Arc<RwLock<InMemoryPromoState>>,
}

impl InMemoryPromoApi {
    /// Creates a new in-memory promo validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a valid code with its discount and message.
    pub fn register_code(&self, code: impl Into<String>, discount: Money, message: impl Into<String>) {
        self.state
            .write()
            .unwrap()
            .codes
            .insert(code.into(), (discount, message.into()));
    }

    /// Configures the service to fail validation calls.
    pub fn set_fail_on_validate(&self, fail: bool) {
        self.state.write().unwrap().fail_on_validate = fail;
    }
}

#[async_trait]
impl PromoValidator for InMemoryPromoApi {
    async fn validate(&self, request: PromoRequest) -> Result<PromoValidation, ClientError> {
        let state = self.state.read().unwrap();

        if state.fail_on_validate {
            return Err(ClientError::Promo("promo service unavailable".to_string()));
        }

        match state.codes.get(&request.code) {
            Some((discount, message)) => Ok(PromoValidation {
                is_valid: true,
                code: request.code,
                discount_amount: *discount,
                message: message.clone(),
            }),
            None => Ok(PromoValidation {
                is_valid: false,
                code: request.code,
                discount_amount: Money::zero(),
                message: "Invalid promo code".to_string(),
            }),
        }
    }
}
