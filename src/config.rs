// src/config.rs

use std::env;
use std::sync::Arc;

use crate::models::booking::Booking;
use crate::models::customer::Customer;
use crate::models::followup::FollowUp;
use crate::models::lead::Lead;
use crate::services::{
    AuditService, BookingService, ConversionService, FollowUpService, InventoryService,
    LeadService,
};
use crate::store::{MemoryStore, RemoteStore};
use crate::sync::SyncedCollection;

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RemoteStore>,

    pub leads: Arc<SyncedCollection<Lead>>,
    pub customers: Arc<SyncedCollection<Customer>>,
    pub bookings: Arc<SyncedCollection<Booking>>,
    pub followups: Arc<SyncedCollection<FollowUp>>,

    pub audit_service: AuditService,
    pub lead_service: LeadService,
    pub followup_service: FollowUpService,
    pub inventory_service: InventoryService,
    pub booking_service: BookingService,
    pub conversion_service: ConversionService,
}

impl AppState {
    /// Monta o grafo de dependências sobre um RemoteStore qualquer.
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        let leads = Arc::new(SyncedCollection::<Lead>::new(store.clone()));
        let customers = Arc::new(SyncedCollection::<Customer>::new(store.clone()));
        let bookings = Arc::new(SyncedCollection::<Booking>::new(store.clone()));
        let followups = Arc::new(SyncedCollection::<FollowUp>::new(store.clone()));

        let audit_service = AuditService::new(store.clone());
        let inventory_service = InventoryService::new(store.clone());
        let lead_service = LeadService::new(leads.clone(), audit_service.clone());
        let followup_service = FollowUpService::new(followups.clone());
        let booking_service = BookingService::new(
            bookings.clone(),
            inventory_service.clone(),
            audit_service.clone(),
        );
        let conversion_service = ConversionService::new(
            leads.clone(),
            customers.clone(),
            bookings.clone(),
            lead_service.clone(),
            inventory_service.clone(),
            audit_service.clone(),
        );

        Self {
            store,
            leads,
            customers,
            bookings,
            followups,
            audit_service,
            lead_service,
            followup_service,
            inventory_service,
            booking_service,
            conversion_service,
        }
    }

    /// Carrega a configuração do ambiente e monta o estado sobre o store
    /// em memória (desenvolvimento local). Em produção, injete a
    /// implementação real de RemoteStore via `AppState::new`.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let default_capacity = env::var("INVENTORY_DEFAULT_CAPACITY")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(20);

        tracing::info!("✅ Store em memória com capacidade padrão {default_capacity} pax/data");
        Ok(Self::new(Arc::new(MemoryStore::new(default_capacity))))
    }
}
