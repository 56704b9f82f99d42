//! Counterparty Store
//!
//! Application state for the counterparty registry:
//! - `AppState` and the `reduce` transition function
//! - `Store` command handlers (add, edit, delete, save) over an injected API
//! - `RefreshTask` polling loop tied to a mounted view's lifetime
//! - `FormSession` binding modal inputs to the validation rules
//!
//! # Example
//!
//! ```rust,ignore
//! use cpty_store::{Store, DEFAULT_REFRESH_INTERVAL};
//! use std::sync::Arc;
//!
//! # async fn example(api: Arc<dyn cpty_client::CounterpartyApi>) {
//! let store = Arc::new(Store::new(api));
//! let mounted = store.mount(DEFAULT_REFRESH_INTERVAL).await;
//!
//! store.handle_add_new();
//! assert!(store.state().is_modal_open());
//!
//! mounted.unmount();
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod form;
pub mod refresh;
pub mod state;
pub mod store;

// Re-exports for convenience
pub use form::{FormMode, FormSession};
pub use refresh::{Mounted, RefreshTask, DEFAULT_REFRESH_INTERVAL};
pub use state::{
    reduce, Action, AppState, LoadStatus, ModalState, DELETE_ERROR, EDIT_ERROR, LOAD_ERROR,
    SAVE_ERROR,
};
pub use store::{RefreshOutcome, SaveOutcome, Store};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
