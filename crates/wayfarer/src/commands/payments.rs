//! Payment command handlers.

use secrecy::ExposeSecret;
use serde::Serialize;

use wayfarer_core::{Checkout, Planner};

use crate::cli::{GlobalOpts, PaymentsArgs, PaymentsCommand};
use crate::error::CliError;
use crate::output;

/// What gets printed for a checkout. The client secret is masked unless
/// `--show-secret` was passed.
#[derive(Debug, Serialize)]
struct CheckoutView {
    payment_id: String,
    reservation_id: String,
    client_secret: String,
}

impl CheckoutView {
    fn new(checkout: &Checkout, show_secret: bool) -> Self {
        Self {
            payment_id: checkout.payment_id.clone(),
            reservation_id: checkout.reservation_id.clone(),
            client_secret: if show_secret {
                checkout.client_secret.expose_secret().to_owned()
            } else {
                "****".into()
            },
        }
    }
}

fn detail(v: &CheckoutView) -> String {
    [
        format!("Payment:     {}", v.payment_id),
        format!("Reservation: {}", v.reservation_id),
        format!("Secret:      {}", v.client_secret),
    ]
    .join("\n")
}

pub async fn handle(
    planner: &Planner,
    args: PaymentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PaymentsCommand::Checkout {
            reservation,
            amount,
            currency,
            show_secret,
        } => {
            let checkout = planner
                .checkout(&reservation, amount, currency.as_deref())
                .await?;
            let view = CheckoutView::new(&checkout, show_secret);
            let out = output::render_single(global.output, &view, detail, |v| {
                v.payment_id.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
