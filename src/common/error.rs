// src/common/error.rs

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::lead::LeadStatus;
use crate::store::StoreError;

// Nosso tipo de erro único, com `thiserror` para melhor ergonomia.
// O núcleo devolve valores tipados; quem apresenta (toast, tela, log)
// decide a mensagem final a partir da variante.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidTransition { from: LeadStatus, to: LeadStatus },

    #[error("Sem capacidade em {date}: {requested} pax solicitados")]
    InventoryExhausted { date: NaiveDate, requested: u32 },

    #[error("Falha ao travar o inventário: {0}")]
    InventoryLockFailed(String),

    #[error("Serviço remoto indisponível: {0}")]
    RemoteUnavailable(String),

    #[error("Registro não encontrado")]
    NotFound,

    #[error("Pré-condição da conversão falhou: {0}")]
    PreconditionFailed(String),

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Erros que a camada de apresentação pode oferecer "tentar novamente".
    /// Esgotamento de capacidade fica de fora: a correção é outra data,
    /// não uma nova tentativa.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::RemoteUnavailable(_) | AppError::InventoryLockFailed(_)
        )
    }

    /// Identifica falha por capacidade, que pede mensagem própria.
    pub fn is_capacity(&self) -> bool {
        matches!(self, AppError::InventoryExhausted { .. })
    }
}

// O operador '?' converte automaticamente StoreError -> AppError
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound,
            StoreError::Unavailable(msg) => AppError::RemoteUnavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_failure_is_not_retryable() {
        let err = AppError::InventoryExhausted {
            date: NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(),
            requested: 2,
        };
        assert!(err.is_capacity());
        assert!(!err.is_retryable());
    }

    #[test]
    fn transport_failures_are_retryable() {
        assert!(AppError::RemoteUnavailable("timeout".into()).is_retryable());
        assert!(AppError::InventoryLockFailed("conexão caiu".into()).is_retryable());
        assert!(!AppError::NotFound.is_retryable());
    }
}
