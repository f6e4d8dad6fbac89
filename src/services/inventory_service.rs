// src/services/inventory_service.rs

use std::sync::Arc;

use chrono::NaiveDate;

use crate::common::error::AppError;
use crate::store::RemoteStore;

// --- RESERVA DE INVENTÁRIO ---

// Embrulha as procedures atômicas de capacidade do store. Sem aplicação
// otimista aqui: o contador por data é compartilhado entre sessões de
// agentes diferentes, então a checagem de capacidade só vale se vier da
// procedure remota.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn RemoteStore>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Reserva `pax_count` lugares na data.
    /// Recusa de negócio vira `InventoryExhausted`; falha de transporte
    /// vira `InventoryLockFailed`.
    pub async fn reserve(&self, date: NaiveDate, pax_count: u32) -> Result<(), AppError> {
        let outcome = self
            .store
            .reserve_capacity(date, pax_count)
            .await
            .map_err(|err| AppError::InventoryLockFailed(err.to_string()))?;

        if outcome.success {
            Ok(())
        } else {
            Err(AppError::InventoryExhausted {
                date,
                requested: pax_count,
            })
        }
    }

    /// Devolve `pax_count` lugares na data (cancelamento comum).
    pub async fn release(&self, date: NaiveDate, pax_count: u32) -> Result<(), AppError> {
        let outcome = self
            .store
            .release_capacity(date, pax_count)
            .await
            .map_err(|err| AppError::InventoryLockFailed(err.to_string()))?;

        if let Some(note) = outcome.error {
            tracing::warn!("liberação em {date} com ressalva: {note}");
        }
        Ok(())
    }

    /// Liberação usada como compensação de uma reserva feita na mesma
    /// operação lógica. Nunca propaga erro: a operação primária já
    /// falhou, e uma compensação perdida é problema de qualidade de
    /// dados a reportar, não um segundo erro a subir.
    pub async fn release_compensating(&self, date: NaiveDate, pax_count: u32) {
        if let Err(err) = self.release(date, pax_count).await {
            tracing::error!(
                "compensação falhou: {pax_count} pax em {date} seguem reservados: {err}"
            );
        }
    }
}
