//! Membridge - Stable record adapter for loosely-specified memory-storage APIs
//!
//! Membridge sits between a UI layer and an upstream memory-storage HTTP API
//! whose response schema is unstable and whose capabilities are thinner than
//! what the UI expects. It normalizes whatever the upstream returns into one
//! canonical record shape and synthesizes the capabilities the upstream
//! lacks: filtering, sorting, pagination, and a partially local state model.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      MemoryGateway                        │
//! │  fetch / search / create / update / delete / state /      │
//! │  related / access logs / stats / apps                     │
//! │        │                    │                             │
//! │  ┌─────▼──────┐      ┌──────▼───────┐                     │
//! │  │ Normalize  │      │ QueryEngine  │                     │
//! │  │ shapes &   │      │ filter/sort/ │                     │
//! │  │ timestamps │      │ paginate     │                     │
//! │  └─────┬──────┘      └──────┬───────┘                     │
//! │        └─────────┬──────────┘                             │
//! │           ┌──────▼────────┐                               │
//! │           │ CanonicalStore │  whole-set replacement only  │
//! │           └───────────────┘                               │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │ MemoryTransport (seam)
//!                  ┌──────────▼──────────┐
//!                  │    HttpTransport     │  reqwest, error
//!                  │  GET/POST/PUT/DELETE │  classification
//!                  └──────────────────────┘
//! ```
//!
//! Two deliberately different error contracts coexist: normalization never
//! fails (unrecognized shapes degrade to empty results with a diagnostic),
//! while transport and validation failures are classified and surfaced
//! unmodified. See [`error::Error`].
//!
//! ## Modules
//!
//! - [`gateway`]: orchestration and the canonical operation set
//! - [`normalize`]: upstream payload and timestamp normalization
//! - [`query`]: client-side filter, sort, and pagination
//! - [`store`]: the shared canonical record set
//! - [`upstream`]: transport seam and the reqwest implementation
//! - [`identity`]: current-user preference port
//! - [`config`]: configuration management
//! - [`record`]: the canonical data model

pub mod config;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod normalize;
pub mod query;
pub mod record;
pub mod store;
pub mod upstream;

pub use config::BridgeConfig;
pub use error::{Error, Result};
pub use gateway::MemoryGateway;
pub use record::{CanonicalRecord, MemoryState};
