// src/sync/collection.rs

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex as AsyncMutex, watch};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::store::{EntityKind, RemoteStore};

// --- A ENTIDADE SINCRONIZÁVEL ---

/// O que uma entidade precisa oferecer para viver numa SyncedCollection:
/// um tipo no store, um id estável e um patch tipado (todas as chaves
/// opcionais, conjunto fixo em compilação).
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    const KIND: EntityKind;
    type Patch: Clone + Send + Sync + Serialize + 'static;

    fn id(&self) -> Uuid;
    fn apply_patch(&mut self, patch: &Self::Patch);
}

struct CacheState<T> {
    items: Vec<T>,
    // Incrementa a cada load concluído; quem esperou o gate e viu o
    // número mudar reaproveita o resultado em vez de buscar de novo.
    load_gen: u64,
}

// --- A COLEÇÃO SINCRONIZADA ---

// Cache local ordenado de uma coleção remota, com mutação otimista:
// a UI vê o efeito imediatamente e, se a chamada remota falhar, o cache
// volta ao snapshot EXATO tirado no momento em que a mutação foi emitida.
//
// Regras de concorrência (importantes, não "otimizar"):
// - toda mutação espera qualquer load() em andamento antes do snapshot;
// - loads são serializados pelo gate, então um load superado nunca
//   sobrescreve dados mais novos (vence a ordem de emissão);
// - o rollback restaura o snapshot da emissão, não um diff reverso.
pub struct SyncedCollection<T: Entity> {
    store: Arc<dyn RemoteStore>,
    state: Mutex<CacheState<T>>,
    load_gate: AsyncMutex<()>,
    watch_tx: watch::Sender<Vec<T>>,
}

impl<T: Entity> SyncedCollection<T> {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        let (watch_tx, _) = watch::channel(Vec::new());
        Self {
            store,
            state: Mutex::new(CacheState {
                items: Vec::new(),
                load_gen: 0,
            }),
            load_gate: AsyncMutex::new(()),
            watch_tx,
        }
    }

    // --- LEITURA / OBSERVAÇÃO ---

    /// Cópia do cache atual.
    pub fn snapshot(&self) -> Vec<T> {
        self.state.lock().unwrap().items.clone()
    }

    pub fn get(&self, id: Uuid) -> Option<T> {
        self.state
            .lock()
            .unwrap()
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    /// Canal de observação: recebe a lista completa a cada mudança.
    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.watch_tx.subscribe()
    }

    // --- LOAD (com coalescência) ---

    /// Busca a coleção remota inteira e substitui o cache.
    /// Loads concorrentes são coalescidos: quem chega com um load em
    /// andamento espera e reaproveita o resultado dele.
    pub async fn load(&self) -> Result<Vec<T>, AppError> {
        let gen_before = self.state.lock().unwrap().load_gen;

        let _gate = self.load_gate.lock().await;
        {
            let state = self.state.lock().unwrap();
            if state.load_gen != gen_before {
                // Outro load terminou enquanto esperávamos o gate.
                return Ok(state.items.clone());
            }
        }

        let raw = self.store.list(T::KIND).await?;
        let items: Vec<T> = raw
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()
            .map_err(decode_err)?;

        {
            let mut state = self.state.lock().unwrap();
            state.items = items.clone();
            state.load_gen += 1;
        }
        self.notify();
        Ok(items)
    }

    // --- MUTAÇÕES OTIMISTAS ---

    /// Insere na cabeça do cache imediatamente e emite o create remoto.
    /// Sucesso: a entrada otimista é trocada pela cópia autoritativa do
    /// servidor (campos atribuídos por ele inclusos). Falha: rollback para
    /// o snapshot da emissão e o erro sobe ao chamador, sem retry.
    pub async fn create(&self, entity: T) -> Result<T, AppError> {
        let record = serde_json::to_value(&entity).map_err(encode_err)?;
        let optimistic = entity.clone();

        let snapshot = {
            let _gate = self.load_gate.lock().await;
            let mut state = self.state.lock().unwrap();
            let snapshot = state.items.clone();
            state.items.insert(0, entity);
            snapshot
        };
        self.notify();

        match self.store.insert(T::KIND, record).await {
            Ok(persisted) => {
                // Reconciliação pela chave otimista: o registro devolvido
                // pelo servidor assume o lugar do aplicado localmente.
                let server = match serde_json::from_value::<T>(persisted) {
                    Ok(server) => server,
                    Err(err) => {
                        tracing::warn!(
                            "resposta do insert de {} malformada, mantendo cópia otimista: {err}",
                            T::KIND.as_str()
                        );
                        optimistic.clone()
                    }
                };
                {
                    let mut state = self.state.lock().unwrap();
                    if let Some(slot) = state
                        .items
                        .iter_mut()
                        .find(|item| item.id() == optimistic.id())
                    {
                        *slot = server.clone();
                    }
                }
                self.notify();
                Ok(server)
            }
            Err(err) => {
                self.restore(snapshot);
                Err(err.into())
            }
        }
    }

    /// Mescla o patch na entidade cacheada imediatamente e emite o patch
    /// remoto. Mesmo contrato de sucesso/rollback do create.
    pub async fn update(&self, id: Uuid, patch: T::Patch) -> Result<T, AppError> {
        let fields = serde_json::to_value(&patch).map_err(encode_err)?;

        let (snapshot, updated) = {
            let _gate = self.load_gate.lock().await;
            let mut state = self.state.lock().unwrap();
            let snapshot = state.items.clone();
            let Some(slot) = state.items.iter_mut().find(|item| item.id() == id) else {
                return Err(AppError::NotFound);
            };
            slot.apply_patch(&patch);
            (snapshot, slot.clone())
        };
        self.notify();

        match self.store.patch(T::KIND, id, fields).await {
            Ok(()) => Ok(updated),
            Err(err) => {
                self.restore(snapshot);
                Err(err.into())
            }
        }
    }

    /// Remove do cache imediatamente e emite o remove remoto.
    /// Mesmo contrato de sucesso/rollback.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let snapshot = {
            let _gate = self.load_gate.lock().await;
            let mut state = self.state.lock().unwrap();
            if !state.items.iter().any(|item| item.id() == id) {
                return Err(AppError::NotFound);
            }
            let snapshot = state.items.clone();
            state.items.retain(|item| item.id() != id);
            snapshot
        };
        self.notify();

        match self.store.remove(T::KIND, id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.restore(snapshot);
                Err(err.into())
            }
        }
    }

    // --- INTERNOS ---

    fn restore(&self, snapshot: Vec<T>) {
        {
            let mut state = self.state.lock().unwrap();
            state.items = snapshot;
        }
        self.notify();
    }

    fn notify(&self) {
        let items = self.state.lock().unwrap().items.clone();
        self.watch_tx.send_replace(items);
    }
}

fn encode_err(err: serde_json::Error) -> AppError {
    AppError::Internal(anyhow::anyhow!("falha ao serializar registro: {err}"))
}

fn decode_err(err: serde_json::Error) -> AppError {
    AppError::Internal(anyhow::anyhow!("registro remoto malformado: {err}"))
}
