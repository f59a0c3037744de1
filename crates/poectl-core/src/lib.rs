//! Business logic for driving switch-port PoE to a desired on/off state.
//!
//! - **Port model** ([`model`]) - [`PortStatus`] snapshots extracted from a
//!   [`DeviceRecord`]'s port table, plus [`MacAddress`] normalization.
//!
//! - **Resolver** ([`resolve`]) - pure diff of current port modes against a
//!   [`DesiredState`], yielding the ordered [`Action`] list and the skipped
//!   ports with a reason.
//!
//! - **[`ControllerGateway`]** - the seam to the controller. [`LegacyGateway`]
//!   implements it over `poectl_api::LegacyClient`; tests swap in fakes.
//!
//! - **[`Orchestrator`]** - sequences connect → locate → read → resolve →
//!   confirm → apply → verify, releases the session on every exit path, and
//!   reports progress through a [`RunObserver`] instead of ambient logging.

pub mod config;
pub mod confirm;
pub mod convert;
pub mod error;
pub mod gateway;
pub mod model;
pub mod observer;
pub mod orchestrator;
pub mod port_spec;
pub mod resolve;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControllerConfig, TlsVerification, VerifyPolicy, controller_url};
pub use confirm::{AutoApprove, Confirmer};
pub use error::CoreError;
pub use gateway::{ControllerGateway, LegacyGateway};
pub use model::{
    Action, DesiredState, DeviceRecord, MacAddress, PortRecord, PortStatus, extract_port_statuses,
};
pub use observer::{RunEvent, RunObserver, TracingObserver};
pub use orchestrator::{Orchestrator, PortVerification, RunReport, RunRequest, RunState};
pub use port_spec::parse_port_spec;
pub use resolve::{Plan, SkipReason, SkippedPort, plan, resolve, resolve_token};
