// src/models/booking.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::EntityKind;
use crate::sync::Entity;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingType {
    Tour,
    Hotel,
    Car,
    Bus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

// --- RESERVA (O Dado) ---

// Criada exatamente uma vez por conversão bem-sucedida.
// Depois de criada, vive independente do lead que a originou.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,

    pub booking_type: BookingType,
    pub title: String,

    pub customer_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,

    pub amount: Decimal,
    pub travel_date: NaiveDate,
    pub pax: u32,

    pub status: BookingStatus,
    pub payment_status: PaymentStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,
}

impl Entity for Booking {
    const KIND: EntityKind = EntityKind::Bookings;
    type Patch = BookingPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn apply_patch(&mut self, patch: &BookingPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(payment_status) = patch.payment_status {
            self.payment_status = payment_status;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(travel_date) = patch.travel_date {
            self.travel_date = travel_date;
        }
        if let Some(customer_id) = patch.customer_id {
            self.customer_id = Some(customer_id);
        }
        self.updated_at = Utc::now();
    }
}
