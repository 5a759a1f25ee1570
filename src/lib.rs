//! # envsync
//!
//! Environment variables transparently backed by a shared, namespaced
//! Redis-compatible key-value store:
//! - get/set/unset/clear/putenv mirrored to the remote namespace
//! - Remote values seeded into the local table at attach
//! - Graceful local-only mode when the store is unreachable
//! - Optional fail-fast policy on any remote failure
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        EnvShim                               │
//! │           (get / set / unset / clear_all / put_env)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 CommandTranslator                            │
//! │        (prefix per call, reply → local side effects)         │
//! └──────┬──────────────────────┬──────────────────┬────────────┘
//!        │                      │                  │
//!        ▼                      ▼                  ▼
//! ┌─────────────┐       ┌──────────────┐    ┌─────────────┐
//! │ RealBackend │       │  Connection  │    │ PanicPolicy │
//! │ (variables) │       │   Manager    │    │             │
//! └─────────────┘       └──────┬───────┘    └─────────────┘
//!                              │ RESP2
//!                              ▼
//!                       ┌──────────────┐
//!                       │ Remote store │
//!                       └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod keys;

pub mod backend;
pub mod loader;
pub mod policy;
pub mod protocol;
pub mod remote;
pub mod shim;
pub mod translator;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use backend::{MemoryEnv, ProcessEnv, RealBackend};
pub use config::Config;
pub use error::{EnvSyncError, Result};
pub use policy::PanicPolicy;
pub use remote::{MemoryStore, TcpConnector};
pub use shim::{AttachStatus, EnvShim};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of envsync
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
