//! Durable state port for the trailstop bot.
//!
//! The real storage engine is an external collaborator; this crate defines
//! the transactional port (`StateStore`) plus the persisted record shapes
//! and an in-memory implementation used by tests and the default runtime.
//!
//! Every trait operation is a self-contained atomic transaction that
//! returns plain values. Callers never hold a handle that can outlive
//! its transaction scope.

pub mod error;
pub mod memory;
pub mod records;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use records::{CredentialRecord, SymbolRecord};
pub use store::StateStore;
