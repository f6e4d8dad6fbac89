pub mod memory;
pub mod remote;

pub use memory::MemoryStore;
pub use remote::{CapacityOutcome, EntityKind, RemoteStore, StoreError};
