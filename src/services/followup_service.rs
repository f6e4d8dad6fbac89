// src/services/followup_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;
use crate::models::followup::{FollowUp, FollowUpPatch, FollowUpStatus, NewFollowUpPayload};
use crate::sync::SyncedCollection;

// --- AGENDA DE FOLLOW-UPS ---

// Cria e ordena tarefas de recontato. Nenhuma transição automática:
// concluir e cancelar são sempre ações explícitas do agente.
#[derive(Clone)]
pub struct FollowUpService {
    followups: Arc<SyncedCollection<FollowUp>>,
}

impl FollowUpService {
    pub fn new(followups: Arc<SyncedCollection<FollowUp>>) -> Self {
        Self { followups }
    }

    pub async fn schedule(&self, payload: NewFollowUpPayload) -> Result<FollowUp, AppError> {
        payload.validate()?;
        self.followups.create(FollowUp::from_payload(payload)).await
    }

    pub async fn mark_done(&self, id: Uuid) -> Result<FollowUp, AppError> {
        self.finish(id, FollowUpStatus::Done).await
    }

    pub async fn cancel(&self, id: Uuid) -> Result<FollowUp, AppError> {
        self.finish(id, FollowUpStatus::Cancelled).await
    }

    async fn finish(&self, id: Uuid, next: FollowUpStatus) -> Result<FollowUp, AppError> {
        let task = self.followups.get(id).ok_or(AppError::NotFound)?;
        if task.status != FollowUpStatus::Pending {
            return Err(AppError::PreconditionFailed(
                "follow-up já finalizado".into(),
            ));
        }
        self.followups
            .update(
                id,
                FollowUpPatch {
                    status: Some(next),
                    ..Default::default()
                },
            )
            .await
    }

    /// Ordena por prioridade descendente (High > Medium > Low), com
    /// desempate pelo horário agendado ascendente.
    pub fn rank(mut pending: Vec<FollowUp>) -> Vec<FollowUp> {
        pending.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.scheduled_for.cmp(&b.scheduled_for))
        });
        pending
    }

    /// Visão "agenda": as pendentes do cache, já ranqueadas.
    pub fn agenda(&self) -> Vec<FollowUp> {
        let pending = self
            .followups
            .snapshot()
            .into_iter()
            .filter(|task| task.status == FollowUpStatus::Pending)
            .collect();
        Self::rank(pending)
    }
}
