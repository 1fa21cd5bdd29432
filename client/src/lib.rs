//! # Client for the hosted backend service
//!
//! Everything the UI needs to talk to the external service that owns
//! persistence, authentication, and realtime fan-out:
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | The two required connection settings (endpoint URL, anonymous key); missing values are fatal at startup. |
//! | [`auth`] | Password sign-in, sign-up (with verification-pending outcome), sign-out, session restore + refresh. |
//! | [`session`] | Session and user types, plus platform-appropriate persistence (localStorage on WASM, data-dir file on native). |
//! | [`tasks`] | REST client for the `tasks` table; implements [`store::TasksBackend`]. |
//! | [`realtime`] | The change-feed channel: JSON frames over a WebSocket, scoped to the signed-in user. |

pub mod auth;
pub mod config;
pub mod error;
pub mod realtime;
pub mod session;
pub mod tasks;

pub use auth::{AuthClient, SignUpOutcome};
pub use config::{Config, ConfigError};
pub use error::ClientError;
pub use session::{AuthUser, Session};
pub use tasks::TasksClient;
