// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditSeverity {
    Info,
    Warning,
    Critical,
}

// --- TRILHA DE AUDITORIA ---

// Registro somente-acréscimo; o fluxo normal nunca atualiza nem apaga.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub action: String,
    pub module: String,
    pub performed_by: String,
    pub details: String,
    pub severity: AuditSeverity,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        action: &str,
        module: &str,
        performed_by: &str,
        details: impl Into<String>,
        severity: AuditSeverity,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action: action.to_string(),
            module: module.to_string(),
            performed_by: performed_by.to_string(),
            details: details.into(),
            severity,
            created_at: Utc::now(),
        }
    }
}
