// src/services/booking_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::audit::AuditSeverity;
use crate::models::booking::{Booking, BookingPatch, BookingStatus};
use crate::services::audit_service::AuditService;
use crate::services::inventory_service::InventoryService;
use crate::sync::SyncedCollection;

// --- CICLO DE VIDA DA RESERVA ---

// Depois de criada pela conversão, a reserva vive por conta própria.
// O cancelamento devolve os lugares da data ao pool compartilhado.
#[derive(Clone)]
pub struct BookingService {
    bookings: Arc<SyncedCollection<Booking>>,
    inventory: InventoryService,
    audit: AuditService,
}

impl BookingService {
    pub fn new(
        bookings: Arc<SyncedCollection<Booking>>,
        inventory: InventoryService,
        audit: AuditService,
    ) -> Self {
        Self {
            bookings,
            inventory,
            audit,
        }
    }

    /// Cancela uma reserva e libera o inventário da data.
    /// Cancelar de novo a mesma reserva é um no-op: a liberação nunca
    /// dispara duas vezes para o mesmo cancelamento lógico.
    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        performed_by: &str,
    ) -> Result<Booking, AppError> {
        let booking = self.bookings.get(booking_id).ok_or(AppError::NotFound)?;

        match booking.status {
            BookingStatus::Cancelled => {
                tracing::debug!("reserva {} já cancelada; nada a fazer", booking.id);
                return Ok(booking);
            }
            BookingStatus::Completed => {
                return Err(AppError::PreconditionFailed(
                    "reserva concluída não pode ser cancelada".into(),
                ));
            }
            BookingStatus::Pending | BookingStatus::Confirmed => {}
        }

        let updated = self
            .bookings
            .update(
                booking_id,
                BookingPatch {
                    status: Some(BookingStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await?;

        // O cancelamento já está cometido no remoto: uma liberação
        // perdida vira auditoria, não falha da operação.
        match self.inventory.release(booking.travel_date, booking.pax).await {
            Ok(()) => {
                self.audit
                    .record(
                        "reserva_cancelada",
                        "bookings",
                        performed_by,
                        format!(
                            "Reserva {} cancelada ({} pax devolvidos em {})",
                            booking.id, booking.pax, booking.travel_date
                        ),
                        AuditSeverity::Info,
                    )
                    .await;
            }
            Err(err) => {
                tracing::warn!(
                    "reserva {} cancelada, mas a liberação de {} pax em {} falhou: {err}",
                    booking.id,
                    booking.pax,
                    booking.travel_date
                );
                self.audit
                    .record(
                        "cancelamento_sem_liberacao",
                        "bookings",
                        performed_by,
                        format!(
                            "Reserva {} cancelada, mas {} pax em {} não foram liberados: {err}",
                            booking.id, booking.pax, booking.travel_date
                        ),
                        AuditSeverity::Warning,
                    )
                    .await;
            }
        }

        Ok(updated)
    }
}
