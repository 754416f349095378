//! Pix purchase example.
//!
//! Creates an auto-captured Pix order and prints the resolved status.
//!
//! # Running this example
//!
//! ```bash
//! export PAGARME_API_KEY=sk_test_...
//! cargo run --example pix_purchase
//! ```
//!
//! Set `PAGARME_LOG_FORMAT=json` for JSON logs.

#![allow(
    clippy::print_stdout,
    clippy::uninlined_format_args,
    reason = "examples are allowed to use println and simple formatting"
)]

use pagarme_gateway::{
    config::GatewayConfig,
    gateway::Gateway,
    item::Item,
    observability::{LogFormat, init_tracing},
    payment::PaymentMethod,
    request::RequestFields,
};
use rust_decimal::Decimal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(LogFormat::from_env())?;

    let gateway = Gateway::new(GatewayConfig::default())?;

    let mut request = gateway.purchase();
    request
        .set_amount(Decimal::new(2_990, 2))?
        .set_payment_method(PaymentMethod::Pix)
        .set_code("EXAMPLE-1")
        .set_items(vec![Item::new("T-shirt", 1, 2_990)])
        .set_customer_reference("cus_example");
    request.payment_mut().pix.expires_in = Some(3_600);

    let response = gateway.send(&request).await?;
    if response.is_successful() {
        println!("order:  {:?}", response.order_reference());
        println!("status: {:?}", response.status());
        if let Some(transaction) = response.last_transaction() {
            println!("qr code: {}", transaction["qr_code"]);
        }
    } else {
        println!("order rejected: {:?}", response.message());
        for (field, messages) in response.errors().iter() {
            println!("  {field}: {}", messages.join("; "));
        }
    }

    Ok(())
}
