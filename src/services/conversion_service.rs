// src/services/conversion_service.rs

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::audit::AuditSeverity;
use crate::models::booking::{Booking, BookingStatus, BookingType, PaymentStatus};
use crate::models::customer::{Customer, CustomerClass, CustomerPatch};
use crate::models::lead::{Lead, LeadLogKind, LeadStatus};
use crate::services::audit_service::AuditService;
use crate::services::inventory_service::InventoryService;
use crate::services::lead_service::LeadService;
use crate::sync::SyncedCollection;

// --- TIPOS DA CONVERSÃO ---

/// Opção de preço escolhida numa proposta. Quando presente, o título e o
/// valor dela valem mais que os campos do lead.
#[derive(Debug, Clone)]
pub struct ProposalOption {
    pub title: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub lead_id: Uuid,
    pub performed_by: String,
    pub booking_type: BookingType,
    pub selected_option: Option<ProposalOption>,
}

/// O que o chamador recebe para navegar até a confirmação.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub customer_created: bool,
    pub lead_marked: bool,
}

// --- O FLUXO DE CONVERSÃO ---

// A única operação orquestrada que transforma um lead aceito (com ou sem
// proposta) numa reserva confirmada. Os passos 1-4 são desfeitos em ordem
// reversa por ações compensatórias quando algo falha; do passo 5 em
// diante é "melhor esforço": reverter uma reserva já cometida é pior que
// uma inconsistência transitória entre lead e reserva, então esta fica
// registrada na auditoria com severidade Warning.
#[derive(Clone)]
pub struct ConversionService {
    leads: Arc<SyncedCollection<Lead>>,
    customers: Arc<SyncedCollection<Customer>>,
    bookings: Arc<SyncedCollection<Booking>>,
    lead_service: LeadService,
    inventory: InventoryService,
    audit: AuditService,
}

impl ConversionService {
    pub fn new(
        leads: Arc<SyncedCollection<Lead>>,
        customers: Arc<SyncedCollection<Customer>>,
        bookings: Arc<SyncedCollection<Booking>>,
        lead_service: LeadService,
        inventory: InventoryService,
        audit: AuditService,
    ) -> Self {
        Self {
            leads,
            customers,
            bookings,
            lead_service,
            inventory,
            audit,
        }
    }

    pub async fn convert(&self, request: ConversionRequest) -> Result<ConversionOutcome, AppError> {
        // --- 1. Pré-condições (falha rápida, sem nenhum efeito) ---
        let lead = self
            .leads
            .get(request.lead_id)
            .ok_or_else(|| AppError::PreconditionFailed("lead não encontrado".into()))?;

        if lead.status == LeadStatus::Converted {
            return Err(AppError::PreconditionFailed("lead já convertido".into()));
        }

        let travel_date = lead
            .trip_start
            .ok_or_else(|| AppError::PreconditionFailed("lead sem data de viagem".into()))?;

        let title = match &request.selected_option {
            Some(option) => option.title.clone(),
            None => {
                if lead.destination.trim().is_empty() {
                    return Err(AppError::PreconditionFailed("lead sem destino".into()));
                }
                format!("Pacote {}", lead.destination)
            }
        };

        let amount = request
            .selected_option
            .as_ref()
            .map(|option| option.amount)
            .or(lead.potential_value)
            .filter(|value| *value > Decimal::ZERO)
            .ok_or_else(|| {
                AppError::PreconditionFailed("lead sem valor para a reserva".into())
            })?;

        if lead.travelers == 0 {
            return Err(AppError::PreconditionFailed("lead sem viajantes".into()));
        }
        let pax = lead.travelers;

        // --- 2. Resolve o cliente (vincula existente ou cria) ---
        // Busca na cópia autoritativa: vários leads podem apontar para o
        // mesmo cadastro.
        self.customers.load().await?;
        let (customer, customer_created) = self.resolve_customer(&lead).await?;

        // --- 3. Reserva o inventário da data (checagem atômica remota) ---
        // Falhou aqui: desfaz o cadastro criado no passo 2 e aborta, sem
        // reserva, sem lead alterado e sem efeito parcial nenhum.
        if let Err(err) = self.inventory.reserve(travel_date, pax).await {
            self.discard_created_customer(&customer, customer_created)
                .await;
            return Err(err);
        }

        // --- 4. Cria a reserva confirmada ---
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            booking_type: request.booking_type,
            title,
            customer_id: Some(customer.id),
            lead_id: Some(lead.id),
            amount,
            travel_date,
            pax,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Unpaid,
            created_at: now,
            updated_at: now,
        };
        let booking = match self.bookings.create(booking).await {
            Ok(booking) => booking,
            Err(err) => {
                // Compensa os passos 3 e 2, em ordem reversa, e aborta.
                self.inventory.release_compensating(travel_date, pax).await;
                self.discard_created_customer(&customer, customer_created)
                    .await;
                return Err(err);
            }
        };

        // --- 5. Lead -> Converted (a reserva criada prevalece) ---
        let lead_marked = match self
            .lead_service
            .change_status(lead.id, LeadStatus::Converted)
            .await
        {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(
                    "reserva {} confirmada, mas o lead {} não marcou Converted: {err}",
                    booking.id,
                    lead.id
                );
                self.audit
                    .record(
                        "conversao_inconsistente",
                        "conversions",
                        &request.performed_by,
                        format!(
                            "Reserva {} confirmada, mas o lead {} não marcou Converted: {err}",
                            booking.id, lead.id
                        ),
                        AuditSeverity::Warning,
                    )
                    .await;
                false
            }
        };

        // --- 6. Histórico do lead + auditoria (melhor esforço) ---
        let customer_note = if customer_created {
            "cliente criado"
        } else {
            "cliente vinculado"
        };

        if lead_marked {
            if let Err(err) = self
                .lead_service
                .append_log(
                    lead.id,
                    LeadLogKind::System,
                    &format!("Convertido na reserva {} ({customer_note})", booking.id),
                )
                .await
            {
                tracing::warn!("falha ao registrar conversão no histórico do lead {}: {err}", lead.id);
            }
        }

        self.audit
            .record(
                "lead_convertido",
                "conversions",
                &request.performed_by,
                format!(
                    "Lead {} convertido na reserva {} ({customer_note}, {} pax em {})",
                    lead.id, booking.id, pax, travel_date
                ),
                AuditSeverity::Info,
            )
            .await;

        self.bump_customer_aggregates(&customer, amount).await;

        // --- 7. Identidade da reserva para a tela de confirmação ---
        Ok(ConversionOutcome {
            booking_id: booking.id,
            customer_id: customer.id,
            customer_created,
            lead_marked,
        })
    }

    /// Procura cliente por e-mail (caixa ignorada) e depois por telefone
    /// (somente dígitos); sem correspondência, cria o cadastro na hora.
    async fn resolve_customer(&self, lead: &Lead) -> Result<(Customer, bool), AppError> {
        let existing = self.customers.snapshot();

        if let Some(email) = lead.email.as_deref() {
            if let Some(found) = existing.iter().find(|c| c.matches_email(email)) {
                return Ok((found.clone(), false));
            }
        }
        if let Some(phone) = lead.phone.as_deref() {
            if let Some(found) = existing.iter().find(|c| c.matches_phone(phone)) {
                return Ok((found.clone(), false));
            }
        }

        let customer = Customer::new_from_contact(
            &lead.full_name,
            lead.email.as_deref(),
            lead.phone.as_deref(),
        );
        let customer = self.customers.create(customer).await?;
        Ok((customer, true))
    }

    /// Compensação do passo 2: remove o cadastro criado nesta mesma
    /// conversão quando um passo seguinte falha. Cliente pré-existente
    /// vinculado nunca é tocado. Como toda compensação, não propaga
    /// erro: uma remoção perdida vira log, não um segundo erro.
    async fn discard_created_customer(&self, customer: &Customer, created_here: bool) {
        if !created_here {
            return;
        }
        if let Err(err) = self.customers.delete(customer.id).await {
            tracing::error!(
                "compensação falhou: cliente {} criado na conversão não foi removido: {err}",
                customer.id
            );
        }
    }

    /// Agregados do cliente após a conversão: contagem, total gasto e a
    /// promoção New -> Returning na segunda reserva (Vip nunca rebaixa).
    async fn bump_customer_aggregates(&self, customer: &Customer, amount: Decimal) {
        let new_count = customer.bookings_count + 1;
        let classification = match customer.classification {
            CustomerClass::New if new_count >= 2 => Some(CustomerClass::Returning),
            _ => None,
        };
        let patch = CustomerPatch {
            bookings_count: Some(new_count),
            total_spent: Some(customer.total_spent + amount),
            classification,
            ..Default::default()
        };
        if let Err(err) = self.customers.update(customer.id, patch).await {
            tracing::warn!("falha ao atualizar agregados do cliente {}: {err}", customer.id);
        }
    }
}
