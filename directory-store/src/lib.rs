//! Data layer for the AI marketing tools directory: the hosted backend
//! client, the row mapper and the optimistic company store.

pub mod backend;
pub mod error;
pub mod form;
pub mod mapper;
pub mod optimistic;
pub mod search;
pub mod seed;
pub mod store;

pub use backend::{
    backend_from_settings, BackendSettings, CompanyBackend, InMemoryBackend, SessionUser,
    SupabaseBackend, SupabaseConfig,
};
pub use error::{RemoteError, StoreError};
pub use form::CompanyForm;
pub use store::{CompanyStore, Notification, NotificationLevel, StoreSnapshot};
