pub mod state;
pub mod storage;
pub mod store;

pub use state::{Session, SessionState};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError, StoredSession};
pub use store::{AuthState, LoginOutcome, PendingChallenge, SessionStore};
