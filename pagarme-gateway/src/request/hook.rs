//! Webhook delivery requests.

use serde_json::{Map, Value};

use super::{
    Endpoint, GatewayRequest, HttpMethod, Operation, RequestContext, RequestFields,
    RequestParameters,
};
use crate::error::Result;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_PAGE_SIZE: i64 = 10;

/// Optional filters forwarded verbatim to the hook listing.
const LIST_FILTERS: [&str; 4] = ["status", "webhook_event", "created_since", "created_until"];

fn hook_endpoint(
    fields: &RequestParameters,
    method: HttpMethod,
    template: &str,
) -> Result<Endpoint> {
    let hook_id = fields.string("hook_id").unwrap_or_default();
    Endpoint::resource(method, template, &[("hook_id", &hook_id)])
}

/// Resends a webhook delivery (`POST hooks/{id}/retry`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetryHookRequest {
    fields: RequestParameters,
}

impl RetryHookRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hook id.
    pub fn set_hook_id(&mut self, hook_id: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("hook_id", hook_id.into());
        self
    }
}

impl RequestFields for RetryHookRequest {
    fn fields(&self) -> &RequestParameters {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut RequestParameters {
        &mut self.fields
    }
}

/// Fetches a webhook delivery (`GET hooks/{id}`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchHookRequest {
    fields: RequestParameters,
}

impl FetchHookRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hook id.
    pub fn set_hook_id(&mut self, hook_id: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("hook_id", hook_id.into());
        self
    }
}

impl RequestFields for FetchHookRequest {
    fn fields(&self) -> &RequestParameters {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut RequestParameters {
        &mut self.fields
    }
}

impl GatewayRequest for RetryHookRequest {
    fn operation(&self) -> Operation {
        Operation::RetryHook
    }

    fn endpoint(&self) -> Result<Endpoint> {
        hook_endpoint(&self.fields, HttpMethod::Post, "hooks/{hook_id}/retry")
    }

    fn data(&self, _ctx: &RequestContext<'_>) -> Result<Option<Value>> {
        self.fields.require_string("hook_id")?;
        Ok(Some(Value::Object(Map::new())))
    }
}

impl GatewayRequest for FetchHookRequest {
    fn operation(&self) -> Operation {
        Operation::FetchHook
    }

    fn endpoint(&self) -> Result<Endpoint> {
        hook_endpoint(&self.fields, HttpMethod::Get, "hooks/{hook_id}")
    }

    fn data(&self, _ctx: &RequestContext<'_>) -> Result<Option<Value>> {
        self.fields.require_string("hook_id")?;
        Ok(None)
    }
}

/// Lists webhook deliveries (`GET hooks`), one page at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListHooksRequest {
    fields: RequestParameters,
}

impl ListHooksRequest {
    /// Creates a request for the first page of 10.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page number.
    pub fn set_page(&mut self, page: i64) -> &mut Self {
        self.fields.params_mut().set("page", page);
        self
    }

    /// Sets the page size.
    pub fn set_size(&mut self, size: i64) -> &mut Self {
        self.fields.params_mut().set("size", size);
        self
    }

    /// Filters by delivery status.
    pub fn set_status(&mut self, status: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("status", status.into());
        self
    }

    /// Filters by event name, e.g. `order.paid`.
    pub fn set_webhook_event(&mut self, event: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("webhook_event", event.into());
        self
    }

    /// Lower bound on creation date.
    pub fn set_created_since(&mut self, since: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("created_since", since.into());
        self
    }

    /// Upper bound on creation date.
    pub fn set_created_until(&mut self, until: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("created_until", until.into());
        self
    }
}

impl RequestFields for ListHooksRequest {
    fn fields(&self) -> &RequestParameters {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut RequestParameters {
        &mut self.fields
    }
}

impl GatewayRequest for ListHooksRequest {
    fn operation(&self) -> Operation {
        Operation::ListHooks
    }

    fn endpoint(&self) -> Result<Endpoint> {
        Ok(Endpoint::get("hooks"))
    }

    fn data(&self, _ctx: &RequestContext<'_>) -> Result<Option<Value>> {
        Ok(None)
    }

    fn query(&self, _ctx: &RequestContext<'_>) -> Result<Vec<(String, String)>> {
        let params = self.fields.params();
        let mut query = vec![
            ("page".to_owned(), params.try_i64("page")?.unwrap_or(DEFAULT_PAGE).to_string()),
            ("size".to_owned(), params.try_i64("size")?.unwrap_or(DEFAULT_PAGE_SIZE).to_string()),
        ];
        for key in LIST_FILTERS {
            if let Some(value) = self.fields.string(key) {
                query.push((key.to_owned(), value));
            }
        }
        Ok(query)
    }
}
