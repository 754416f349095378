//! Transaction lookups. Both authenticate with `api_key` in the query string.

use rust_decimal::Decimal;
use serde_json::Value;

use super::{
    Endpoint, GatewayRequest, HttpMethod, Operation, RequestContext, RequestFields,
    RequestParameters,
};
use crate::error::{GatewayError, Result};

/// Fetches a transaction (`GET transactions/{id}`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchTransactionRequest {
    fields: RequestParameters,
}

impl FetchTransactionRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestFields for FetchTransactionRequest {
    fn fields(&self) -> &RequestParameters {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut RequestParameters {
        &mut self.fields
    }
}

impl GatewayRequest for FetchTransactionRequest {
    fn operation(&self) -> Operation {
        Operation::FetchTransaction
    }

    fn endpoint(&self) -> Result<Endpoint> {
        let id = self.fields.string("transaction_reference").unwrap_or_default();
        Endpoint::resource(
            HttpMethod::Get,
            "transactions/{transaction_reference}",
            &[("transaction_reference", &id)],
        )
    }

    fn data(&self, _ctx: &RequestContext<'_>) -> Result<Option<Value>> {
        Ok(None)
    }

    fn query(&self, ctx: &RequestContext<'_>) -> Result<Vec<(String, String)>> {
        self.fields.require_string("transaction_reference")?;
        Ok(vec![("api_key".to_owned(), ctx.api_key().to_owned())])
    }
}

/// Simulates installment amounts
/// (`GET transactions/calculate_installments_amount`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculateInstallmentsRequest {
    fields: RequestParameters,
}

impl CalculateInstallmentsRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the monthly interest rate, in percent.
    pub fn set_interest_rate(&mut self, rate: Decimal) -> &mut Self {
        self.fields.params_mut().set("interest_rate", rate.to_string());
        self
    }

    /// Sets the maximum installment count.
    pub fn set_max_installments(&mut self, max: i64) -> &mut Self {
        self.fields.params_mut().set("max_installments", max);
        self
    }

    /// Sets how many installments carry no interest.
    pub fn set_free_installments(&mut self, free: i64) -> &mut Self {
        self.fields.params_mut().set("free_installments", free);
        self
    }

    fn interest_rate(&self) -> Result<String> {
        let raw = self.fields.require_string("interest_rate")?;
        raw.trim()
            .parse::<Decimal>()
            .map(|rate| rate.normalize().to_string())
            .map_err(|e| GatewayError::invalid("interest_rate", format!("'{raw}' is not a number: {e}")))
    }
}

impl RequestFields for CalculateInstallmentsRequest {
    fn fields(&self) -> &RequestParameters {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut RequestParameters {
        &mut self.fields
    }
}

impl GatewayRequest for CalculateInstallmentsRequest {
    fn operation(&self) -> Operation {
        Operation::CalculateInstallments
    }

    fn endpoint(&self) -> Result<Endpoint> {
        Ok(Endpoint::get("transactions/calculate_installments_amount"))
    }

    fn data(&self, _ctx: &RequestContext<'_>) -> Result<Option<Value>> {
        Ok(None)
    }

    fn query(&self, ctx: &RequestContext<'_>) -> Result<Vec<(String, String)>> {
        let amount = self.fields.require_amount()?;
        let interest_rate = self.interest_rate()?;
        let params = self.fields.params();
        let max_installments = params
            .try_i64("max_installments")?
            .ok_or_else(|| GatewayError::MissingParameter("max_installments".to_owned()))?;
        let free_installments = params.try_i64("free_installments")?.unwrap_or(0);

        Ok(vec![
            ("api_key".to_owned(), ctx.api_key().to_owned()),
            ("amount".to_owned(), amount.to_string()),
            ("max_installments".to_owned(), max_installments.to_string()),
            ("free_installments".to_owned(), free_installments.to_string()),
            ("interest_rate".to_owned(), interest_rate),
        ])
    }
}

#[cfg(test)]
#[allow(clippy::unreachable, reason = "test code uses unreachable for expected-path assertions")]
mod tests {
    use super::*;

    fn keys(query: &[(String, String)]) -> Vec<&str> {
        query.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn test_fetch_transaction_query_carries_api_key() {
        let mut request = FetchTransactionRequest::new();
        let ctx = RequestContext::new("sk_test_123");
        assert!(request.query(&ctx).is_err());

        request.set_transaction_reference("tran_1");
        let query = request.query(&ctx).expect("query builds");
        assert_eq!(query, vec![("api_key".to_owned(), "sk_test_123".to_owned())]);
        assert_eq!(
            request.endpoint().ok().map(|e| e.path().to_owned()),
            Some("transactions/tran_1".to_owned())
        );
    }

    #[test]
    fn test_installments_validation_order() {
        let ctx = RequestContext::new("sk");
        let mut request = CalculateInstallmentsRequest::new();

        let Err(err) = request.query(&ctx) else { unreachable!("amount is required") };
        assert_eq!(err.field(), Some("amount"));

        request.set_amount(Decimal::new(10_000, 2)).expect("amount is valid");
        let Err(err) = request.query(&ctx) else { unreachable!("interest rate is required") };
        assert_eq!(err.field(), Some("interest_rate"));

        request.set_interest_rate(Decimal::new(199, 2));
        let Err(err) = request.query(&ctx) else { unreachable!("max installments is required") };
        assert_eq!(err.field(), Some("max_installments"));
    }

    #[test]
    fn test_installments_query() {
        let mut request = CalculateInstallmentsRequest::new();
        request
            .set_amount(Decimal::new(10_000, 2))
            .expect("amount is valid")
            .set_max_installments(12);
        request.set_interest_rate(Decimal::new(199, 2)).set_free_installments(3);

        let query = request.query(&RequestContext::new("sk")).expect("query builds");
        assert_eq!(
            keys(&query),
            vec!["api_key", "amount", "max_installments", "free_installments", "interest_rate"]
        );
        assert_eq!(query[1].1, "10000");
        assert_eq!(query[2].1, "12");
        assert_eq!(query[3].1, "3");
        assert_eq!(query[4].1, "1.99");
        assert_eq!(request.data(&RequestContext::new("sk")).ok(), Some(None));
    }
}
