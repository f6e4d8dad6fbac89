// src/models/customer.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::contact;
use crate::store::EntityKind;
use crate::sync::Entity;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerClass {
    New,
    Returning,
    Vip,
}

// --- CLIENTE (O Dado) ---

// Um cliente não pertence a nenhum lead: vários leads podem resolver
// para o mesmo cadastro ao longo do tempo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,

    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,

    pub classification: CustomerClass,
    pub bookings_count: u32,
    pub total_spent: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Cadastro mínimo criado preguiçosamente durante a conversão.
    pub fn new_from_contact(
        full_name: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            classification: CustomerClass::New,
            bookings_count: 0,
            total_spent: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn matches_email(&self, candidate: &str) -> bool {
        self.email
            .as_deref()
            .is_some_and(|own| contact::email_matches(own, candidate))
    }

    pub fn matches_phone(&self, candidate: &str) -> bool {
        self.phone
            .as_deref()
            .is_some_and(|own| contact::phone_matches(own, candidate))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<CustomerClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookings_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_spent: Option<Decimal>,
}

impl Entity for Customer {
    const KIND: EntityKind = EntityKind::Customers;
    type Patch = CustomerPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn apply_patch(&mut self, patch: &CustomerPatch) {
        if let Some(full_name) = &patch.full_name {
            self.full_name = full_name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
        if let Some(phone) = &patch.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(classification) = patch.classification {
            self.classification = classification;
        }
        if let Some(bookings_count) = patch.bookings_count {
            self.bookings_count = bookings_count;
        }
        if let Some(total_spent) = patch.total_spent {
            self.total_spent = total_spent;
        }
        self.updated_at = Utc::now();
    }
}
