//! # Keyline
//!
//! A self-hostable client portal: studio admins review onboarding applications,
//! send contracts, run projects, bill invoices and hand over deliverables, while
//! clients sign, follow progress and message the studio.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! keyline = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use keyline::config::ServerConfig;
//! use keyline::notify::{LogMailer, Notifier};
//! use keyline::realtime::MessageHub;
//! use keyline::server::{AppState, create_router};
//! use keyline::storage::FileStorage;
//! use keyline::store::{SqliteStore, Store};
//!
//! let config = ServerConfig::load("./data").unwrap();
//! let store: Arc<dyn Store> = Arc::new(SqliteStore::new(config.db_path()).unwrap());
//! store.initialize().unwrap();
//!
//! let notifier = Arc::new(Notifier::new(store.clone(), Arc::new(LogMailer), &config.notify));
//! let state = Arc::new(AppState {
//!     store,
//!     storage: FileStorage::new(&config.data_dir),
//!     hub: MessageHub::new(),
//!     notifier,
//!     config,
//! });
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes CLI module. Disable with `default-features = false`.

pub mod auth;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod notify;
pub mod realtime;
pub mod server;
pub mod storage;
pub mod store;
pub mod types;
pub mod workflow;
