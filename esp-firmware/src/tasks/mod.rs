// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// Tasks teilen sich den Geräte-Kontext über einen blockierenden Mutex.

pub mod http;
pub mod indicator;
pub mod mdns;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use http::http_server_task;
pub use indicator::indicator_task;
pub use mdns::mdns_responder_task;
pub use wifi::{dhcp_server_task, net_task, station_ip_task};
