pub mod collection;

pub use collection::{Entity, SyncedCollection};
