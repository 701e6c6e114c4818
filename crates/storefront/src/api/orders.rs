//! Payment and order endpoints.

use reqwest::Method;
use tracing::instrument;

use grips_gears_core::TransactionId;

use super::catalog::encode;
use super::{
    ApiClient, ApiError, Order, PaymentInitRequest, PaymentInitResponse, PaymentVerification,
};

impl ApiClient {
    /// Start a gateway payment session for the cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status. A
    /// `success: false` body is returned as-is for the caller to report.
    #[instrument(skip(self, request, token), fields(email = request.email, total = %request.total_amount))]
    pub async fn init_payment(
        &self,
        request: &PaymentInitRequest<'_>,
        token: &str,
    ) -> Result<PaymentInitResponse, ApiError> {
        self.send_json(Method::POST, "/payment/init", request, token)
            .await
    }

    /// Ask the API to re-check a transaction with the gateway.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token), fields(tran_id = %tran_id))]
    pub async fn verify_payment(
        &self,
        tran_id: &TransactionId,
        token: &str,
    ) -> Result<PaymentVerification, ApiError> {
        self.get_json(
            &format!("/payment/verify/{}", encode(tran_id.as_str())),
            Some(token),
        )
        .await
    }

    /// List the orders placed by `email`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token))]
    pub async fn orders(&self, email: &str, token: &str) -> Result<Vec<Order>, ApiError> {
        self.get_json(&format!("/orders?email={}", encode(email)), Some(token))
            .await
    }

    /// Fetch one order by transaction id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when no such transaction exists.
    #[instrument(skip(self, token), fields(tran_id = %tran_id))]
    pub async fn order(&self, tran_id: &TransactionId, token: &str) -> Result<Order, ApiError> {
        self.get_json(
            &format!("/orders/{}", encode(tran_id.as_str())),
            Some(token),
        )
        .await
    }
}
