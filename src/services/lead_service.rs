// src/services/lead_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::common::contact;
use crate::common::error::AppError;
use crate::models::audit::AuditSeverity;
use crate::models::lead::{Lead, LeadLog, LeadLogKind, LeadPatch, LeadStatus, NewLeadPayload};
use crate::services::audit_service::AuditService;
use crate::sync::SyncedCollection;

// --- TIPOS DO FLUXO DE ENTRADA ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Email,
    Phone,
}

/// Suspeita de duplicata encontrada na triagem de entrada.
#[derive(Debug, Clone)]
pub struct DuplicateMatch {
    pub existing_id: Uuid,
    pub existing_name: String,
    pub field: DuplicateField,
}

/// Resultado da entrada de um lead. A suspeita de duplicata NÃO bloqueia:
/// devolve a confirmação pendente e o chamador decide se insiste.
#[derive(Debug, Clone)]
pub enum LeadIntake {
    Created(Lead),
    DuplicateSuspected(DuplicateMatch),
}

// --- SERVIÇO DE LEADS ---

// Dono do funil: entrada com triagem de duplicatas, transições de status
// pela tabela do funil e histórico somente-acréscimo.
#[derive(Clone)]
pub struct LeadService {
    leads: Arc<SyncedCollection<Lead>>,
    audit: AuditService,
}

impl LeadService {
    pub fn new(leads: Arc<SyncedCollection<Lead>>, audit: AuditService) -> Self {
        Self { leads, audit }
    }

    // =========================================================================
    //  1. ENTRADA (formulário de inquérito / cadastro manual)
    // =========================================================================

    /// Registra um lead novo. Com `duplicate_confirmed = false`, uma
    /// suspeita de duplicata volta como `DuplicateSuspected` sem criar
    /// nada; o chamador reapresenta com `true` para insistir.
    pub async fn submit_inquiry(
        &self,
        payload: NewLeadPayload,
        duplicate_confirmed: bool,
    ) -> Result<LeadIntake, AppError> {
        payload.validate()?;

        // Triagem contra a cópia autoritativa, não contra cache velho.
        self.leads.load().await?;

        if !duplicate_confirmed {
            if let Some(suspect) = self.screen_duplicates(&payload) {
                return Ok(LeadIntake::DuplicateSuspected(suspect));
            }
        }

        let mut lead = Lead::from_payload(payload);
        lead.logs.push(LeadLog::now(LeadLogKind::System, "Lead registrado"));

        let created = self.leads.create(lead).await?;
        Ok(LeadIntake::Created(created))
    }

    /// Checagem branda de duplicata: mesmo e-mail (caixa ignorada) ou
    /// mesmo telefone (somente dígitos). Só na criação, nunca na edição.
    fn screen_duplicates(&self, payload: &NewLeadPayload) -> Option<DuplicateMatch> {
        let existing = self.leads.snapshot();

        if let Some(email) = payload.email.as_deref() {
            for lead in &existing {
                if lead
                    .email
                    .as_deref()
                    .is_some_and(|own| contact::email_matches(own, email))
                {
                    return Some(DuplicateMatch {
                        existing_id: lead.id,
                        existing_name: lead.full_name.clone(),
                        field: DuplicateField::Email,
                    });
                }
            }
        }

        if let Some(phone) = payload.phone.as_deref() {
            for lead in &existing {
                if lead
                    .phone
                    .as_deref()
                    .is_some_and(|own| contact::phone_matches(own, phone))
                {
                    return Some(DuplicateMatch {
                        existing_id: lead.id,
                        existing_name: lead.full_name.clone(),
                        field: DuplicateField::Phone,
                    });
                }
            }
        }

        None
    }

    // =========================================================================
    //  2. FUNIL (transições e edição)
    // =========================================================================

    /// Única porta de saída de status: valida o par na tabela do funil
    /// antes de tocar o cache ou o remoto.
    pub async fn change_status(&self, lead_id: Uuid, next: LeadStatus) -> Result<Lead, AppError> {
        self.update_details(
            lead_id,
            LeadPatch {
                status: Some(next),
                ..Default::default()
            },
        )
        .await
    }

    /// Edição parcial. Se o patch carregar status, passa pela mesma
    /// validação de transição do `change_status`.
    pub async fn update_details(&self, lead_id: Uuid, patch: LeadPatch) -> Result<Lead, AppError> {
        if let Some(next) = patch.status {
            let lead = self.leads.get(lead_id).ok_or(AppError::NotFound)?;
            if !lead.status.can_transition_to(next) {
                return Err(AppError::InvalidTransition {
                    from: lead.status,
                    to: next,
                });
            }
        }
        self.leads.update(lead_id, patch).await
    }

    /// Acrescenta uma entrada ao histórico do lead (append-only).
    pub async fn append_log(
        &self,
        lead_id: Uuid,
        kind: LeadLogKind,
        message: &str,
    ) -> Result<Lead, AppError> {
        let lead = self.leads.get(lead_id).ok_or(AppError::NotFound)?;
        let mut logs = lead.logs.clone();
        logs.push(LeadLog::now(kind, message));
        self.leads
            .update(
                lead_id,
                LeadPatch {
                    logs: Some(logs),
                    ..Default::default()
                },
            )
            .await
    }

    // =========================================================================
    //  3. EXCLUSÃO (somente ação administrativa explícita)
    // =========================================================================

    pub async fn delete_lead(&self, lead_id: Uuid, performed_by: &str) -> Result<(), AppError> {
        self.leads.delete(lead_id).await?;
        self.audit
            .record(
                "lead_excluido",
                "leads",
                performed_by,
                format!("Lead {lead_id} excluído por ação administrativa"),
                AuditSeverity::Info,
            )
            .await;
        Ok(())
    }
}
