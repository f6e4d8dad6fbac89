// src/store/remote.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

// --- TIPOS DO CONTRATO ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Leads,
    Customers,
    Bookings,
    FollowUps,
    AuditLogs,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Leads => "leads",
            EntityKind::Customers => "customers",
            EntityKind::Bookings => "bookings",
            EntityKind::FollowUps => "follow_ups",
            EntityKind::AuditLogs => "audit_logs",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Registro não encontrado")]
    NotFound,

    #[error("Serviço indisponível: {0}")]
    Unavailable(String),
}

/// Resultado das procedures atômicas de capacidade.
/// `success = false` significa recusa de negócio (sem capacidade);
/// `error` carrega detalhe adicional, inclusive em sucessos com ressalva.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// --- O CONTRATO ---

// A fronteira com o serviço de dados remoto. O núcleo só conversa com o
// armazenamento através desta trait; o motor por trás dela (HTTP, banco,
// memória) fica fora do escopo.
//
// `reserve_capacity`/`release_capacity` são atômicas em relação a chamadas
// concorrentes de outras sessões. O contador de capacidade por data é o
// ÚNICO estado compartilhado entre sessões independentes; a correção dele
// vem daqui, nunca de otimismo no cliente.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Sequência ordenada de todos os registros do tipo.
    async fn list(&self, kind: EntityKind) -> Result<Vec<Value>, StoreError>;

    /// Insere e devolve o registro persistido (campos atribuídos pelo
    /// servidor inclusos).
    async fn insert(&self, kind: EntityKind, record: Value) -> Result<Value, StoreError>;

    /// Aplica campos parciais ao registro com o id dado.
    async fn patch(&self, kind: EntityKind, id: Uuid, fields: Value) -> Result<(), StoreError>;

    /// Remove o registro com o id dado.
    async fn remove(&self, kind: EntityKind, id: Uuid) -> Result<(), StoreError>;

    /// Reserva `pax_count` lugares na data. Falha de negócio (sem
    /// capacidade) vem como `success = false`, sem efeito parcial.
    async fn reserve_capacity(
        &self,
        date: NaiveDate,
        pax_count: u32,
    ) -> Result<CapacityOutcome, StoreError>;

    /// Devolve `pax_count` lugares na data. Liberar além do reservado
    /// trava em zero e segue com sucesso: é um problema de qualidade de
    /// dados a reportar, não um motivo para bloquear compensação.
    async fn release_capacity(
        &self,
        date: NaiveDate,
        pax_count: u32,
    ) -> Result<CapacityOutcome, StoreError>;
}
