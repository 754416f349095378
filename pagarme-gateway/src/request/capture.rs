//! Charge capture (`POST charges/{charge_id}/capture`).

use serde_json::{Map, Value};

use super::{
    Endpoint, GatewayRequest, HttpMethod, Operation, RequestContext, RequestFields,
    RequestParameters,
};
use crate::{error::Result, params::insert_some};

/// Captures a previously authorized charge, fully or partially.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureRequest {
    fields: RequestParameters,
}

impl CaptureRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestFields for CaptureRequest {
    fn fields(&self) -> &RequestParameters {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut RequestParameters {
        &mut self.fields
    }
}

impl GatewayRequest for CaptureRequest {
    fn operation(&self) -> Operation {
        Operation::Capture
    }

    fn endpoint(&self) -> Result<Endpoint> {
        let charge_id = self.fields.string("transaction_reference").unwrap_or_default();
        Endpoint::resource(
            HttpMethod::Post,
            "charges/{transaction_reference}/capture",
            &[("transaction_reference", &charge_id)],
        )
    }

    fn data(&self, _ctx: &RequestContext<'_>) -> Result<Option<Value>> {
        self.fields.require_string("transaction_reference")?;

        let mut data = Map::new();
        insert_some(&mut data, "amount", self.fields.amount_integer()?.filter(|amount| *amount != 0));
        insert_some(&mut data, "code", self.fields.string("code"));
        Ok(Some(Value::Object(data)))
    }
}
