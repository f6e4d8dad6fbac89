// src/store/memory.rs

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use super::remote::{CapacityOutcome, EntityKind, RemoteStore, StoreError};

/// Contador de capacidade de uma data. Invariante: `booked <= capacity`
/// após toda reserva bem-sucedida.
#[derive(Debug, Clone, Copy)]
pub struct CapacityDay {
    pub capacity: u32,
    pub booked: u32,
}

// --- STORE EM MEMÓRIA ---

// Implementação local do RemoteStore, usada pelo binário de demonstração e
// pela suíte de testes. Os locks cobrem cada operação inteira, então as
// procedures de capacidade são atômicas como o contrato exige.
pub struct MemoryStore {
    records: Mutex<HashMap<EntityKind, Vec<Value>>>,
    capacity: Mutex<HashMap<NaiveDate, CapacityDay>>,
    default_capacity: u32,
}

impl MemoryStore {
    pub fn new(default_capacity: u32) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            capacity: Mutex::new(HashMap::new()),
            default_capacity,
        }
    }

    /// Define o contador de uma data (setup de testes e da demo).
    pub fn set_capacity(&self, date: NaiveDate, capacity: u32, booked: u32) {
        self.capacity
            .lock()
            .unwrap()
            .insert(date, CapacityDay { capacity, booked });
    }

    /// Lê o contador de uma data, com o padrão aplicado se nunca tocada.
    pub fn capacity_on(&self, date: NaiveDate) -> CapacityDay {
        self.capacity
            .lock()
            .unwrap()
            .get(&date)
            .copied()
            .unwrap_or(CapacityDay {
                capacity: self.default_capacity,
                booked: 0,
            })
    }

    fn record_id_matches(record: &Value, id: Uuid) -> bool {
        record
            .get("id")
            .and_then(Value::as_str)
            .is_some_and(|raw| raw == id.to_string())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Value>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records.get(&kind).cloned().unwrap_or_default())
    }

    async fn insert(&self, kind: EntityKind, record: Value) -> Result<Value, StoreError> {
        let mut obj = match record {
            Value::Object(obj) => obj,
            _ => {
                return Err(StoreError::Unavailable(
                    "registro precisa ser um objeto JSON".into(),
                ));
            }
        };

        // Campos atribuídos pelo servidor: id (se ausente) e timestamps.
        let has_id = obj.get("id").and_then(Value::as_str).is_some();
        if !has_id {
            obj.insert("id".into(), json!(Uuid::new_v4().to_string()));
        }
        let now = json!(Utc::now());
        obj.entry("createdAt").or_insert_with(|| now.clone());
        obj.insert("updatedAt".into(), now);

        let persisted = Value::Object(obj);
        let mut records = self.records.lock().unwrap();
        // Mais novos primeiro, espelhando a leitura ordenada por criação.
        records
            .entry(kind)
            .or_default()
            .insert(0, persisted.clone());
        Ok(persisted)
    }

    async fn patch(&self, kind: EntityKind, id: Uuid, fields: Value) -> Result<(), StoreError> {
        let patch_obj: Map<String, Value> = match fields {
            Value::Object(obj) => obj,
            _ => {
                return Err(StoreError::Unavailable(
                    "patch precisa ser um objeto JSON".into(),
                ));
            }
        };

        let mut records = self.records.lock().unwrap();
        let list = records.entry(kind).or_default();
        let Some(record) = list.iter_mut().find(|r| Self::record_id_matches(r, id)) else {
            return Err(StoreError::NotFound);
        };

        if let Value::Object(target) = record {
            for (key, value) in patch_obj {
                if key == "id" {
                    continue;
                }
                target.insert(key, value);
            }
            target.insert("updatedAt".into(), json!(Utc::now()));
        }
        Ok(())
    }

    async fn remove(&self, kind: EntityKind, id: Uuid) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let list = records.entry(kind).or_default();
        let before = list.len();
        list.retain(|r| !Self::record_id_matches(r, id));
        if list.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn reserve_capacity(
        &self,
        date: NaiveDate,
        pax_count: u32,
    ) -> Result<CapacityOutcome, StoreError> {
        let mut capacity = self.capacity.lock().unwrap();
        let day = capacity.entry(date).or_insert(CapacityDay {
            capacity: self.default_capacity,
            booked: 0,
        });

        if day.booked + pax_count > day.capacity {
            // Recusa sem efeito parcial: o contador não muda.
            return Ok(CapacityOutcome {
                success: false,
                error: Some(format!(
                    "capacidade esgotada em {date}: {} de {} ocupados",
                    day.booked, day.capacity
                )),
            });
        }

        day.booked += pax_count;
        Ok(CapacityOutcome {
            success: true,
            error: None,
        })
    }

    async fn release_capacity(
        &self,
        date: NaiveDate,
        pax_count: u32,
    ) -> Result<CapacityOutcome, StoreError> {
        let mut capacity = self.capacity.lock().unwrap();
        let day = capacity.entry(date).or_insert(CapacityDay {
            capacity: self.default_capacity,
            booked: 0,
        });

        if pax_count > day.booked {
            // Trava em zero e segue: bug de lógica a reportar, não erro duro.
            tracing::warn!(
                "liberação além do reservado em {date}: {pax_count} pax, {} ocupados",
                day.booked
            );
            day.booked = 0;
            return Ok(CapacityOutcome {
                success: true,
                error: Some("liberação além do reservado; contador travado em zero".into()),
            });
        }

        day.booked -= pax_count;
        Ok(CapacityOutcome {
            success: true,
            error: None,
        })
    }
}
