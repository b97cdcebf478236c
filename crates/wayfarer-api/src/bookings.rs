// Booking and payment endpoints.

use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

use crate::actions::{DEFAULT_CURRENCY, require};
use crate::client::TripClient;
use crate::error::Error;
use crate::models::{
    Acknowledgement, Booking, BookingEnvelope, BookingsEnvelope, CheckoutRequest,
    FinalizedBooking,
};

/// A payment intent created for a reservation.
///
/// `client_secret` is handed to the payment widget; it is never logged.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub payment_id: String,
    pub reservation_id: String,
    pub client_secret: SecretString,
}

#[derive(Deserialize)]
struct RawCheckout {
    payment_id: String,
    #[serde(default)]
    reservation_id: Option<String>,
    client_secret: String,
}

impl TripClient {
    /// `GET /bookings`
    pub async fn list_bookings(&self) -> Result<Vec<Booking>, Error> {
        let url = self.endpoint(&["bookings"])?;
        let envelope: BookingsEnvelope = self.get(url).await?;
        Ok(envelope.bookings)
    }

    /// `GET /bookings/{id}`
    pub async fn get_booking(&self, booking_id: &str) -> Result<Booking, Error> {
        require("booking_id", booking_id)?;
        let url = self.endpoint(&["bookings", booking_id])?;
        let envelope: BookingEnvelope = self.get(url).await?;
        Ok(envelope.booking)
    }

    /// `POST /bookings/{id}/cancel`
    pub async fn cancel_booking(&self, booking_id: &str) -> Result<Acknowledgement, Error> {
        require("booking_id", booking_id)?;
        let url = self.endpoint(&["bookings", booking_id, "cancel"])?;
        debug!(booking_id, "cancelling booking");
        self.post_empty(url).await
    }

    /// Turn a paid reservation into a confirmed booking.
    ///
    /// `POST /trips/{id}/book?reservation_id=&payment_id=`
    pub async fn finalize_booking(
        &self,
        trip_id: &str,
        reservation_id: &str,
        payment_id: &str,
    ) -> Result<FinalizedBooking, Error> {
        require("trip_id", trip_id)?;
        require("reservation_id", reservation_id)?;
        require("payment_id", payment_id)?;
        let url = self.endpoint(&["trips", trip_id, "book"])?;
        debug!(trip_id, reservation_id, "finalizing booking");
        self.post_with_params(
            url,
            &[
                ("reservation_id", reservation_id.to_owned()),
                ("payment_id", payment_id.to_owned()),
            ],
        )
        .await
    }

    /// Create a payment intent for a held reservation.
    ///
    /// `POST /payments/checkout`. `currency` defaults to INR.
    pub async fn checkout(
        &self,
        reservation_id: &str,
        amount: f64,
        currency: Option<&str>,
    ) -> Result<Checkout, Error> {
        require("reservation_id", reservation_id)?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::validation(
                "amount",
                format!("must be a positive number, got {amount}"),
            ));
        }
        let currency = currency.unwrap_or(DEFAULT_CURRENCY).trim();
        require("currency", currency)?;

        let url = self.endpoint(&["payments", "checkout"])?;
        debug!(reservation_id, "creating checkout");
        let body = CheckoutRequest {
            reservation_id: reservation_id.to_owned(),
            amount,
            currency: currency.to_ascii_uppercase(),
        };
        let raw: RawCheckout = self.post(url, &body).await?;
        Ok(Checkout {
            payment_id: raw.payment_id,
            reservation_id: raw
                .reservation_id
                .unwrap_or_else(|| reservation_id.to_owned()),
            client_secret: SecretString::from(raw.client_secret),
        })
    }
}
