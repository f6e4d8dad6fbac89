// src/models/lead.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::store::EntityKind;
use crate::sync::Entity;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    New,
    Warm,
    Hot,
    Cold,
    OfferSent,
    Converted,
}

impl LeadStatus {
    /// Tabela de transições do funil. Qualquer par fora daqui é rejeitado.
    /// `Cold` pode ser reativado; `Converted` é terminal.
    pub fn allowed_next(self) -> &'static [LeadStatus] {
        use LeadStatus::*;
        match self {
            New => &[Warm, Hot, Cold, OfferSent, Converted],
            Warm => &[Hot, Cold, OfferSent, Converted],
            Hot => &[OfferSent, Converted, Cold],
            OfferSent => &[Converted, Cold, Hot],
            Cold => &[New, Warm],
            Converted => &[],
        }
    }

    pub fn can_transition_to(self, next: LeadStatus) -> bool {
        self.allowed_next().contains(&next)
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LeadStatus::New => "New",
            LeadStatus::Warm => "Warm",
            LeadStatus::Hot => "Hot",
            LeadStatus::Cold => "Cold",
            LeadStatus::OfferSent => "Offer Sent",
            LeadStatus::Converted => "Converted",
        };
        f.write_str(label)
    }
}

// Prioridade compartilhada entre Lead e FollowUp.
// A ordem das variantes importa: Low < Medium < High (usada no ranking).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadSource {
    #[default]
    Website,
    WhatsApp,
    Instagram,
    Referral,
    Manual,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadLogKind {
    Note,
    Call,
    Email,
    Quote,
    System,
    WhatsApp,
}

// --- HISTÓRICO DO LEAD ---

// Entradas imutáveis, somente acréscimo (append-only).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadLog {
    pub at: DateTime<Utc>,
    pub kind: LeadLogKind,
    pub message: String,
}

impl LeadLog {
    pub fn now(kind: LeadLogKind, message: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            kind,
            message: message.into(),
        }
    }
}

// --- LEAD (O Dado) ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,

    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub whatsapp_same_as_phone: bool,

    pub destination: String,
    pub trip_start: Option<NaiveDate>,
    pub trip_end: Option<NaiveDate>,
    pub travelers: u32,
    pub potential_value: Option<Decimal>,

    pub status: LeadStatus,
    pub priority: Priority,
    pub source: LeadSource,
    pub assignee: Option<String>,

    pub logs: Vec<LeadLog>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- PATCH (atualização parcial tipada) ---

// Todos os campos opcionais, mas o conjunto de chaves é fixo em compilação.
// Status NÃO entra aqui sem passar pela máquina de estados (LeadService).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_end: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travelers: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<LeadLog>>,
}

// --- PAYLOAD DE ENTRADA (formulário de inquérito) ---

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewLeadPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    pub full_name: String,

    #[validate(email(message = "E-mail inválido"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub whatsapp_same_as_phone: bool,

    #[validate(length(min = 2, message = "Informe o destino"))]
    pub destination: String,

    pub trip_start: Option<NaiveDate>,
    pub trip_end: Option<NaiveDate>,

    #[validate(range(min = 1, message = "Informe ao menos 1 viajante"))]
    pub travelers: u32,

    pub potential_value: Option<Decimal>,
    #[serde(default)]
    pub source: LeadSource,
    pub priority: Option<Priority>,
    pub assignee: Option<String>,
}

impl Lead {
    /// Monta um lead novo a partir do formulário de entrada.
    /// Resolve o "WhatsApp igual ao telefone" aqui, uma vez só.
    pub fn from_payload(payload: NewLeadPayload) -> Self {
        let now = Utc::now();
        let whatsapp = if payload.whatsapp_same_as_phone {
            payload.phone.clone()
        } else {
            payload.whatsapp
        };

        Self {
            id: Uuid::new_v4(),
            full_name: payload.full_name,
            email: payload.email,
            phone: payload.phone,
            whatsapp,
            whatsapp_same_as_phone: payload.whatsapp_same_as_phone,
            destination: payload.destination,
            trip_start: payload.trip_start,
            trip_end: payload.trip_end,
            travelers: payload.travelers,
            potential_value: payload.potential_value,
            status: LeadStatus::New,
            priority: payload.priority.unwrap_or(Priority::Medium),
            source: payload.source,
            assignee: payload.assignee,
            logs: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Lead {
    const KIND: EntityKind = EntityKind::Leads;
    type Patch = LeadPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn apply_patch(&mut self, patch: &LeadPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(assignee) = &patch.assignee {
            self.assignee = Some(assignee.clone());
        }
        if let Some(destination) = &patch.destination {
            self.destination = destination.clone();
        }
        if let Some(trip_start) = patch.trip_start {
            self.trip_start = Some(trip_start);
        }
        if let Some(trip_end) = patch.trip_end {
            self.trip_end = Some(trip_end);
        }
        if let Some(travelers) = patch.travelers {
            self.travelers = travelers;
        }
        if let Some(potential_value) = patch.potential_value {
            self.potential_value = Some(potential_value);
        }
        if let Some(logs) = &patch.logs {
            self.logs = logs.clone();
        }
        self.updated_at = Utc::now();
    }
}
