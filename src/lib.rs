// src/lib.rs

// Núcleo de CRM e conversão de reservas de uma agência de viagens:
// cache otimista sincronizado com o store remoto, funil de leads,
// reserva atômica de inventário por data e o fluxo de conversão.

pub mod common;
pub mod config;
pub mod models;
pub mod services;
pub mod store;
pub mod sync;
