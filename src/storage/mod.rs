//! Storage layer.
//!
//! Traits describe the persistence collaborator; `memory` provides the
//! thread-safe in-memory backends used for embedding and tests.

mod memory;
mod traits;

pub use memory::{InMemoryOptionStore, InMemorySessionStore, InMemoryStores, InMemoryUserStore};
pub use traits::{OptionStore, SessionStore, StorageError, UserStore};
