pub mod audit_service;
pub mod booking_service;
pub mod conversion_service;
pub mod followup_service;
pub mod inventory_service;
pub mod lead_service;

pub use audit_service::AuditService;
pub use booking_service::BookingService;
pub use conversion_service::{ConversionOutcome, ConversionRequest, ConversionService, ProposalOption};
pub use followup_service::FollowUpService;
pub use inventory_service::InventoryService;
pub use lead_service::{DuplicateField, DuplicateMatch, LeadIntake, LeadService};
