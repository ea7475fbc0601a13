//! External collaborators of the interest wizard.
//!
//! The wizard hands a [`FinalizedRecord`] to a [`RecordStore`] and a
//! [`Notifier`] exactly once per confirmed submission. Both traits are
//! object safe so the session can hold them as `Arc<dyn _>`; the HTTP
//! implementations live behind the `http` feature and the in-memory ones
//! are always available for tests and dry runs.

pub mod config;
pub mod notify;
pub mod record;
pub mod store;

#[cfg(feature = "http")]
pub mod resend;
#[cfg(feature = "http")]
pub mod supabase;

pub use config::{ConfigError, ResendConfig, SupabaseConfig};
pub use notify::{ConfirmationEmail, MemoryNotifier, NotificationError, Notifier};
pub use record::{FinalizedRecord, LogisticsStatus, PaymentStatus, SavedRecord, SurgeryType};
pub use store::{MemoryStore, PersistenceError, RecordStore};

#[cfg(feature = "http")]
pub use resend::ResendNotifier;
#[cfg(feature = "http")]
pub use supabase::SupabaseStore;
