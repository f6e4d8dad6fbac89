// src/main.rs

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use agencia_core::config::AppState;
use agencia_core::models::booking::BookingType;
use agencia_core::models::followup::NewFollowUpPayload;
use agencia_core::models::followup::FollowUpKind;
use agencia_core::models::lead::{LeadLogKind, LeadSource, LeadStatus, NewLeadPayload, Priority};
use agencia_core::services::{ConversionRequest, LeadIntake};

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let state = AppState::from_env().expect("Falha ao inicializar o estado da aplicação.");

    // --- Passeio completo pelo funil, contra o store em memória ---

    let inquiry = NewLeadPayload {
        full_name: "Ana Souza".into(),
        email: Some("ana.souza@exemplo.com".into()),
        phone: Some("+55 (71) 99999-0000".into()),
        whatsapp: None,
        whatsapp_same_as_phone: true,
        destination: "Chapada Diamantina".into(),
        trip_start: NaiveDate::from_ymd_opt(2026, 1, 15),
        trip_end: NaiveDate::from_ymd_opt(2026, 1, 20),
        travelers: 2,
        potential_value: Some(Decimal::from(8500)),
        source: LeadSource::Website,
        priority: Some(Priority::High),
        assignee: Some("carla".into()),
    };

    let lead = match state
        .lead_service
        .submit_inquiry(inquiry.clone(), false)
        .await
        .expect("Falha ao registrar o lead")
    {
        LeadIntake::Created(lead) => lead,
        LeadIntake::DuplicateSuspected(suspect) => {
            panic!("store vazio não deveria ter duplicata: {suspect:?}")
        }
    };
    tracing::info!("✅ Lead registrado: {} ({})", lead.full_name, lead.id);

    // O mesmo formulário de novo: a triagem deve pedir confirmação.
    match state
        .lead_service
        .submit_inquiry(inquiry, false)
        .await
        .expect("Falha na triagem de duplicata")
    {
        LeadIntake::DuplicateSuspected(suspect) => {
            tracing::info!(
                "⚠️ Duplicata suspeita de {} via {:?}",
                suspect.existing_name,
                suspect.field
            );
        }
        LeadIntake::Created(_) => panic!("a triagem deveria ter sinalizado duplicata"),
    }

    state
        .lead_service
        .change_status(lead.id, LeadStatus::Hot)
        .await
        .expect("Falha na transição de status");
    state
        .lead_service
        .append_log(lead.id, LeadLogKind::Call, "Cliente retornou, quer fechar")
        .await
        .expect("Falha ao registrar ligação");

    state
        .followup_service
        .schedule(NewFollowUpPayload {
            lead_id: lead.id,
            scheduled_for: Utc::now() + Duration::hours(4),
            kind: FollowUpKind::WhatsApp,
            priority: Priority::High,
            description: "Enviar roteiro final".into(),
        })
        .await
        .expect("Falha ao agendar follow-up");
    tracing::info!("📋 Agenda com {} tarefa(s) pendente(s)", state.followup_service.agenda().len());

    let outcome = state
        .conversion_service
        .convert(ConversionRequest {
            lead_id: lead.id,
            performed_by: "carla".into(),
            booking_type: BookingType::Tour,
            selected_option: None,
        })
        .await
        .expect("Falha na conversão");
    tracing::info!(
        "🚀 Conversão concluída: reserva {} (cliente {} {})",
        outcome.booking_id,
        outcome.customer_id,
        if outcome.customer_created { "criado" } else { "vinculado" }
    );

    let trail = state
        .audit_service
        .recent()
        .await
        .expect("Falha ao ler a auditoria");
    for entry in trail {
        tracing::info!("🧾 [{:?}] {}: {}", entry.severity, entry.action, entry.details);
    }
}
