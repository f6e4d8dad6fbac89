// src/services/audit_service.rs

use std::sync::Arc;

use crate::common::error::AppError;
use crate::models::audit::{AuditEntry, AuditSeverity};
use crate::store::{EntityKind, RemoteStore};

// --- TRILHA DE AUDITORIA ---

// Escritor somente-acréscimo. Gravar auditoria é efeito colateral das
// ações administrativas: uma falha aqui vira log, nunca falha da operação
// que a disparou.
#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn RemoteStore>,
}

impl AuditService {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    pub async fn record(
        &self,
        action: &str,
        module: &str,
        performed_by: &str,
        details: impl Into<String>,
        severity: AuditSeverity,
    ) {
        let entry = AuditEntry::new(action, module, performed_by, details, severity);
        let record = match serde_json::to_value(&entry) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!("entrada de auditoria não serializável ({action}): {err}");
                return;
            }
        };
        if let Err(err) = self.store.insert(EntityKind::AuditLogs, record).await {
            tracing::warn!("falha ao gravar auditoria ({action}): {err}");
        }
    }

    /// Leitura da trilha para a tela de administração (mais novas primeiro).
    pub async fn recent(&self) -> Result<Vec<AuditEntry>, AppError> {
        let raw = self.store.list(EntityKind::AuditLogs).await?;
        let entries = raw
            .into_iter()
            .filter_map(|record| match serde_json::from_value(record) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!("entrada de auditoria malformada ignorada: {err}");
                    None
                }
            })
            .collect();
        Ok(entries)
    }
}
