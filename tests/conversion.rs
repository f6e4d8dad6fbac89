// tests/conversion.rs
//
// Cenários ponta a ponta do fluxo de conversão, contra o store em
// memória e um wrapper que injeta falhas por operação.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use agencia_core::common::error::AppError;
use agencia_core::config::AppState;
use agencia_core::models::audit::AuditSeverity;
use agencia_core::models::booking::{BookingStatus, BookingType, PaymentStatus};
use agencia_core::models::customer::Customer;
use agencia_core::models::lead::{Lead, LeadSource, LeadStatus, NewLeadPayload, Priority};
use agencia_core::services::{ConversionRequest, LeadIntake};
use agencia_core::store::{CapacityOutcome, EntityKind, MemoryStore, RemoteStore, StoreError};

const TRAVEL_DATE: (i32, u32, u32) = (2025, 12, 20);

fn travel_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(TRAVEL_DATE.0, TRAVEL_DATE.1, TRAVEL_DATE.2).unwrap()
}

fn payload(name: &str, email: &str) -> NewLeadPayload {
    NewLeadPayload {
        full_name: name.into(),
        email: Some(email.into()),
        phone: Some("71 99999-0000".into()),
        whatsapp: None,
        whatsapp_same_as_phone: false,
        destination: "Lençóis".into(),
        trip_start: Some(travel_date()),
        trip_end: None,
        travelers: 2,
        potential_value: Some(Decimal::from(4000)),
        source: LeadSource::Website,
        priority: Some(Priority::High),
        assignee: None,
    }
}

async fn created_lead(state: &AppState, payload: NewLeadPayload) -> Lead {
    match state
        .lead_service
        .submit_inquiry(payload, true)
        .await
        .unwrap()
    {
        LeadIntake::Created(lead) => lead,
        LeadIntake::DuplicateSuspected(suspect) => panic!("duplicata inesperada: {suspect:?}"),
    }
}

fn request(lead_id: Uuid) -> ConversionRequest {
    ConversionRequest {
        lead_id,
        performed_by: "carla".into(),
        booking_type: BookingType::Tour,
        selected_option: None,
    }
}

// --- Cenário A: nenhum cliente existente -> cria um ---

#[tokio::test]
async fn conversion_creates_customer_when_none_matches() {
    let store = Arc::new(MemoryStore::new(20));
    let state = AppState::new(store.clone());

    let lead = created_lead(&state, payload("Ana Souza", "a@x.com")).await;
    let outcome = state.conversion_service.convert(request(lead.id)).await.unwrap();

    assert!(outcome.customer_created);
    assert!(outcome.lead_marked);

    // Exatamente um cliente novo
    let customers = state.customers.snapshot();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].id, outcome.customer_id);

    // Uma reserva confirmada, não paga, apontando para o cliente
    let bookings = state.bookings.snapshot();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].id, outcome.booking_id);
    assert_eq!(bookings[0].status, BookingStatus::Confirmed);
    assert_eq!(bookings[0].payment_status, PaymentStatus::Unpaid);
    assert_eq!(bookings[0].customer_id, Some(outcome.customer_id));

    // Lead terminou Converted
    assert_eq!(state.leads.get(lead.id).unwrap().status, LeadStatus::Converted);

    // Auditoria registra que o cliente foi criado
    let trail = state.audit_service.recent().await.unwrap();
    let entry = trail
        .iter()
        .find(|entry| entry.action == "lead_convertido")
        .expect("auditoria da conversão ausente");
    assert!(entry.details.contains("cliente criado"));

    // Converter de novo o mesmo lead é pré-condição violada
    let err = state.conversion_service.convert(request(lead.id)).await.unwrap_err();
    assert!(matches!(err, AppError::PreconditionFailed(_)));
}

// --- Cenário B: cliente existente com o e-mail em outra caixa ---

#[tokio::test]
async fn conversion_links_existing_customer_by_email_case_insensitive() {
    let store = Arc::new(MemoryStore::new(20));
    let state = AppState::new(store.clone());

    let existing = state
        .customers
        .create(Customer::new_from_contact("Ana Prévia", Some("A@x.com"), None))
        .await
        .unwrap();

    let lead = created_lead(&state, payload("Ana Souza", "a@x.com")).await;
    let outcome = state.conversion_service.convert(request(lead.id)).await.unwrap();

    assert!(!outcome.customer_created);
    assert_eq!(outcome.customer_id, existing.id);
    assert_eq!(state.customers.snapshot().len(), 1);

    let booking = state.bookings.get(outcome.booking_id).unwrap();
    assert_eq!(booking.customer_id, Some(existing.id));

    let trail = state.audit_service.recent().await.unwrap();
    let entry = trail
        .iter()
        .find(|entry| entry.action == "lead_convertido")
        .unwrap();
    assert!(entry.details.contains("cliente vinculado"));

    // Agregados do cliente vinculado foram atualizados
    let refreshed = state.customers.get(existing.id).unwrap();
    assert_eq!(refreshed.bookings_count, 1);
    assert_eq!(refreshed.total_spent, Decimal::from(4000));
}

// --- Cenário C: capacidade esgotada aborta sem efeitos ---

#[tokio::test]
async fn conversion_fails_cleanly_when_capacity_is_exhausted() {
    let store = Arc::new(MemoryStore::new(20));
    store.set_capacity(travel_date(), 10, 9);
    let state = AppState::new(store.clone());

    let lead = created_lead(&state, payload("Ana Souza", "a@x.com")).await;
    let err = state.conversion_service.convert(request(lead.id)).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::InventoryExhausted { requested: 2, .. }
    ));
    assert!(err.is_capacity());

    // Sem reserva, lead intocado, contador intocado
    assert!(state.bookings.snapshot().is_empty());
    assert_eq!(state.leads.get(lead.id).unwrap().status, LeadStatus::New);
    assert_eq!(store.capacity_on(travel_date()).booked, 9);

    // O cadastro criado no passo 2 também foi desfeito: falha por
    // capacidade não deixa NENHUM efeito parcial, nem no remoto.
    assert!(state.customers.snapshot().is_empty());
    state.customers.load().await.unwrap();
    assert!(state.customers.snapshot().is_empty());
}

// --- Cliente pré-existente vinculado nunca é descartado na compensação ---

#[tokio::test]
async fn capacity_failure_never_discards_linked_customer() {
    let store = Arc::new(MemoryStore::new(20));
    store.set_capacity(travel_date(), 10, 9);
    let state = AppState::new(store.clone());

    let existing = state
        .customers
        .create(Customer::new_from_contact("Ana Prévia", Some("a@x.com"), None))
        .await
        .unwrap();

    let lead = created_lead(&state, payload("Ana Souza", "a@x.com")).await;
    let err = state.conversion_service.convert(request(lead.id)).await.unwrap_err();
    assert!(err.is_capacity());

    // O cadastro vinculado segue de pé
    let customers = state.customers.snapshot();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].id, existing.id);
}

// --- Cenário D: reserva criada, atualização do lead falha ---

// Wrapper que injeta falhas por tipo de operação.
struct FaultStore {
    inner: MemoryStore,
    fail_lead_patch: AtomicBool,
    fail_reserve: AtomicBool,
    fail_booking_insert: AtomicBool,
}

impl FaultStore {
    fn new(default_capacity: u32) -> Self {
        Self {
            inner: MemoryStore::new(default_capacity),
            fail_lead_patch: AtomicBool::new(false),
            fail_reserve: AtomicBool::new(false),
            fail_booking_insert: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl RemoteStore for FaultStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Value>, StoreError> {
        self.inner.list(kind).await
    }

    async fn insert(&self, kind: EntityKind, record: Value) -> Result<Value, StoreError> {
        if kind == EntityKind::Bookings && self.fail_booking_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("insert de reserva recusado".into()));
        }
        self.inner.insert(kind, record).await
    }

    async fn patch(&self, kind: EntityKind, id: Uuid, fields: Value) -> Result<(), StoreError> {
        if kind == EntityKind::Leads && self.fail_lead_patch.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("patch de lead recusado".into()));
        }
        self.inner.patch(kind, id, fields).await
    }

    async fn remove(&self, kind: EntityKind, id: Uuid) -> Result<(), StoreError> {
        self.inner.remove(kind, id).await
    }

    async fn reserve_capacity(
        &self,
        date: NaiveDate,
        pax_count: u32,
    ) -> Result<CapacityOutcome, StoreError> {
        if self.fail_reserve.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("conexão caiu".into()));
        }
        self.inner.reserve_capacity(date, pax_count).await
    }

    async fn release_capacity(
        &self,
        date: NaiveDate,
        pax_count: u32,
    ) -> Result<CapacityOutcome, StoreError> {
        self.inner.release_capacity(date, pax_count).await
    }
}

#[tokio::test]
async fn booking_survives_when_lead_update_fails_after_commit() {
    let store = Arc::new(FaultStore::new(20));
    let state = AppState::new(store.clone());

    let lead = created_lead(&state, payload("Ana Souza", "a@x.com")).await;

    store.fail_lead_patch.store(true, Ordering::SeqCst);
    let outcome = state.conversion_service.convert(request(lead.id)).await.unwrap();

    // A reserva fica de pé e é consultável
    assert!(!outcome.lead_marked);
    let booking = state.bookings.get(outcome.booking_id).unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);

    // O inventário continua decrementado (sem rollback)
    assert_eq!(store.inner.capacity_on(travel_date()).booked, 2);

    // A inconsistência vira auditoria com severidade Warning
    let trail = state.audit_service.recent().await.unwrap();
    let warning = trail
        .iter()
        .find(|entry| entry.action == "conversao_inconsistente")
        .expect("auditoria de inconsistência ausente");
    assert_eq!(warning.severity, AuditSeverity::Warning);

    // O lead não marcou Converted (o patch falhou e o cache reverteu)
    assert_eq!(state.leads.get(lead.id).unwrap().status, LeadStatus::New);
}

// --- Falha ao criar a reserva compensa inventário E cliente criado ---

#[tokio::test]
async fn booking_create_failure_compensates_reservation_and_customer() {
    let store = Arc::new(FaultStore::new(20));
    let state = AppState::new(store.clone());

    let lead = created_lead(&state, payload("Ana Souza", "a@x.com")).await;
    store.fail_booking_insert.store(true, Ordering::SeqCst);

    let err = state.conversion_service.convert(request(lead.id)).await.unwrap_err();
    assert!(matches!(err, AppError::RemoteUnavailable(_)));

    // Rollback em ordem reversa: sem reserva, lugares devolvidos,
    // cadastro do passo 2 desfeito, lead intocado.
    assert!(state.bookings.snapshot().is_empty());
    assert_eq!(store.inner.capacity_on(travel_date()).booked, 0);
    assert!(state.customers.snapshot().is_empty());
    assert_eq!(state.leads.get(lead.id).unwrap().status, LeadStatus::New);
}

// --- Falha de transporte na reserva é um erro retentável próprio ---

#[tokio::test]
async fn reserve_transport_failure_maps_to_lock_failed() {
    let store = Arc::new(FaultStore::new(20));
    let state = AppState::new(store.clone());

    let lead = created_lead(&state, payload("Ana Souza", "a@x.com")).await;
    store.fail_reserve.store(true, Ordering::SeqCst);

    let err = state.conversion_service.convert(request(lead.id)).await.unwrap_err();
    assert!(matches!(err, AppError::InventoryLockFailed(_)));
    assert!(err.is_retryable());
    assert!(state.bookings.snapshot().is_empty());
}

// --- Cancelamento devolve os lugares; repetir é no-op ---

#[tokio::test]
async fn cancellation_releases_capacity_exactly_once() {
    let store = Arc::new(MemoryStore::new(20));
    store.set_capacity(travel_date(), 10, 0);
    let state = AppState::new(store.clone());

    let lead = created_lead(&state, payload("Ana Souza", "a@x.com")).await;
    let outcome = state.conversion_service.convert(request(lead.id)).await.unwrap();
    assert_eq!(store.capacity_on(travel_date()).booked, 2);

    let cancelled = state
        .booking_service
        .cancel_booking(outcome.booking_id, "carla")
        .await
        .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(store.capacity_on(travel_date()).booked, 0);

    // Repetição: nada muda, contador nunca fica negativo
    let again = state
        .booking_service
        .cancel_booking(outcome.booking_id, "carla")
        .await
        .unwrap();
    assert_eq!(again.status, BookingStatus::Cancelled);
    assert_eq!(store.capacity_on(travel_date()).booked, 0);
}

// --- Triagem de duplicatas na entrada ---

#[tokio::test]
async fn intake_flags_duplicates_but_never_blocks() {
    let store = Arc::new(MemoryStore::new(20));
    let state = AppState::new(store.clone());

    created_lead(&state, payload("Ana Souza", "a@x.com")).await;

    // Mesmo e-mail em caixa diferente: suspeita, sem criar nada
    let intake = state
        .lead_service
        .submit_inquiry(payload("Ana S.", "A@X.COM"), false)
        .await
        .unwrap();
    assert!(matches!(intake, LeadIntake::DuplicateSuspected(_)));
    assert_eq!(state.leads.snapshot().len(), 1);

    // Confirmando, a criação segue normalmente
    let intake = state
        .lead_service
        .submit_inquiry(payload("Ana S.", "A@X.COM"), true)
        .await
        .unwrap();
    assert!(matches!(intake, LeadIntake::Created(_)));
    assert_eq!(state.leads.snapshot().len(), 2);
}

// --- Transições fora da tabela não mudam o status armazenado ---

#[tokio::test]
async fn invalid_transition_is_rejected_without_side_effects() {
    let store = Arc::new(MemoryStore::new(20));
    let state = AppState::new(store.clone());

    let lead = created_lead(&state, payload("Ana Souza", "a@x.com")).await;
    state
        .lead_service
        .change_status(lead.id, LeadStatus::Cold)
        .await
        .unwrap();

    // Cold não converte direto
    let err = state
        .lead_service
        .change_status(lead.id, LeadStatus::Converted)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidTransition {
            from: LeadStatus::Cold,
            to: LeadStatus::Converted
        }
    ));
    assert_eq!(state.leads.get(lead.id).unwrap().status, LeadStatus::Cold);

    // E a cópia remota também não mudou
    state.leads.load().await.unwrap();
    assert_eq!(state.leads.get(lead.id).unwrap().status, LeadStatus::Cold);
}
