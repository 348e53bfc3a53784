//! ESP Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert Traits, die Status-LED Engine, die Provisionierungs-
//! Zustandsmaschine und die HTTP-Handler. Alles läuft auf dem Host testbar.

#![no_std]

pub mod api;
pub mod app;
pub mod error;
pub mod indicator;
pub mod logic;
pub mod provisioning;
pub mod storage;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use api::ApiResponse;
pub use app::DeviceContext;
pub use error::{ConnectTimeout, LedError, NetworkError, StorageError, UpdateError, ValidationError};
pub use indicator::{BlinkPattern, IndicatorPattern, StatusIndicator};
pub use provisioning::{Provisioner, ProvisioningConfig, await_connection, transition};
pub use storage::{PersistentCredentialStore, StorageDriver};
pub use traits::{Clock, CredentialStore, NetworkDriver, PixelSink};
pub use types::{ConnectionState, HexColor, LinkStatus, NetworkCredentials, ScanEntry, WifiMode};
