// src/models/followup.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::lead::Priority;
use crate::store::EntityKind;
use crate::sync::Entity;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FollowUpKind {
    Call,
    Email,
    WhatsApp,
    Meeting,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FollowUpStatus {
    Pending,
    Done,
    Cancelled,
}

// --- FOLLOW-UP (tarefa de recontato) ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub id: Uuid,
    pub lead_id: Uuid,

    pub scheduled_for: DateTime<Utc>,
    pub kind: FollowUpKind,
    pub priority: Priority,
    pub status: FollowUpStatus,
    pub description: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FollowUp {
    /// Atrasada: horário agendado estritamente antes de `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_for < now
    }

    /// Para hoje: mesma data de calendário, independente da hora.
    pub fn is_due_today(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_for.date_naive() == now.date_naive()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FollowUpStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewFollowUpPayload {
    pub lead_id: Uuid,
    pub scheduled_for: DateTime<Utc>,
    pub kind: FollowUpKind,
    pub priority: Priority,

    #[validate(length(min = 3, message = "Descreva o follow-up"))]
    pub description: String,
}

impl FollowUp {
    pub fn from_payload(payload: NewFollowUpPayload) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            lead_id: payload.lead_id,
            scheduled_for: payload.scheduled_for,
            kind: payload.kind,
            priority: payload.priority,
            status: FollowUpStatus::Pending,
            description: payload.description,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for FollowUp {
    const KIND: EntityKind = EntityKind::FollowUps;
    type Patch = FollowUpPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn apply_patch(&mut self, patch: &FollowUpPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(scheduled_for) = patch.scheduled_for {
            self.scheduled_for = scheduled_for;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task_at(when: DateTime<Utc>) -> FollowUp {
        FollowUp {
            id: Uuid::new_v4(),
            lead_id: Uuid::new_v4(),
            scheduled_for: when,
            kind: FollowUpKind::Call,
            priority: Priority::Medium,
            status: FollowUpStatus::Pending,
            description: "ligar de volta".into(),
            created_at: when,
            updated_at: when,
        }
    }

    #[test]
    fn overdue_is_strictly_before_now() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        assert!(task_at(now - chrono::Duration::minutes(1)).is_overdue(now));
        assert!(!task_at(now).is_overdue(now));
        assert!(!task_at(now + chrono::Duration::minutes(1)).is_overdue(now));
    }

    #[test]
    fn due_today_ignores_time_of_day() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap();
        let tonight = Utc.with_ymd_and_hms(2025, 6, 10, 23, 30, 0).unwrap();
        let tomorrow = Utc.with_ymd_and_hms(2025, 6, 11, 0, 30, 0).unwrap();
        assert!(task_at(tonight).is_due_today(now));
        assert!(!task_at(tomorrow).is_due_today(now));
    }
}
