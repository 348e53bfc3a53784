// WiFi-Treiber: NetworkDriver über esp-radio
//
// Die Zustandsmaschine in esp-core entscheidet, dieser Treiber setzt nur
// um. Alle Aufrufe sind synchron; die Radio-Tasks von esp-rtos laufen
// währenddessen weiter.

use alloc::string::String;

use defmt::{Debug2Format, info, warn};
use esp_core::error::NetworkError;
use esp_core::traits::NetworkDriver;
use esp_core::types::{AuthMode, LinkStatus, ScanEntry, ScanResults, WifiMode};
use esp_radio::wifi::{
    AccessPointConfig, AuthMethod, ClientConfig, ModeConfig, ScanConfig, WifiController,
};

pub struct EspWifiDriver {
    controller: WifiController<'static>,
    mode: WifiMode,
    auto_reconnect: bool,
    /// Station-Verbindung angestoßen (unterscheidet Connecting von Idle)
    connect_requested: bool,
}

impl EspWifiDriver {
    pub fn new(controller: WifiController<'static>) -> Self {
        Self {
            controller,
            mode: WifiMode::Station,
            auto_reconnect: true,
            connect_requested: false,
        }
    }

    pub fn auto_reconnect(&self) -> bool {
        self.auto_reconnect
    }

    /// Stoppt das Radio (falls nötig), setzt die Konfiguration und startet neu
    fn apply(&mut self, config: ModeConfig) -> Result<(), NetworkError> {
        if matches!(self.controller.is_started(), Ok(true)) {
            self.controller.stop().map_err(|e| {
                warn!("WiFi: Failed to stop: {}", Debug2Format(&e));
                NetworkError::ConfigFailed
            })?;
        }

        self.controller.set_config(&config).map_err(|e| {
            warn!("WiFi: Failed to set configuration: {}", Debug2Format(&e));
            NetworkError::ConfigFailed
        })?;

        self.controller.start().map_err(|e| {
            warn!("WiFi: Failed to start: {}", Debug2Format(&e));
            NetworkError::StartFailed
        })
    }
}

fn auth_mode(method: Option<AuthMethod>) -> AuthMode {
    match method {
        None | Some(AuthMethod::None) => AuthMode::Open,
        Some(AuthMethod::Wep) => AuthMode::Wep,
        Some(AuthMethod::Wpa) => AuthMode::WpaPersonal,
        Some(AuthMethod::Wpa2Personal) => AuthMode::Wpa2Personal,
        Some(AuthMethod::Wpa3Personal) => AuthMode::Wpa3Personal,
        Some(AuthMethod::Wpa2Enterprise) => AuthMode::Enterprise,
        Some(_) => AuthMode::Other,
    }
}

impl NetworkDriver for EspWifiDriver {
    fn set_mode(&mut self, mode: WifiMode) -> Result<(), NetworkError> {
        // Wirksam mit der nächsten Konfiguration (AP-Start oder Connect)
        self.mode = mode;
        Ok(())
    }

    fn start_access_point(&mut self, ssid: &str, password: &str) -> Result<(), NetworkError> {
        let ap_config = AccessPointConfig::default()
            .with_ssid(String::from(ssid))
            .with_password(String::from(password))
            .with_auth_method(AuthMethod::Wpa2Personal);

        let config = match self.mode {
            WifiMode::AccessPointStation => ModeConfig::ApSta(ClientConfig::default(), ap_config),
            WifiMode::AccessPoint | WifiMode::Station => ModeConfig::AccessPoint(ap_config),
        };

        self.connect_requested = false;
        self.apply(config)?;
        info!("WiFi: Access point '{}' is up", ssid);
        Ok(())
    }

    fn begin_station_connect(&mut self, ssid: &str, password: &str) -> Result<(), NetworkError> {
        let client_config = ClientConfig::default()
            .with_ssid(String::from(ssid))
            .with_password(String::from(password));

        self.apply(ModeConfig::Client(client_config))?;
        self.connect_requested = true;

        info!("WiFi: Connecting to '{}'...", ssid);
        self.controller.connect().map_err(|e| {
            warn!("WiFi: Connect request failed: {}", Debug2Format(&e));
            NetworkError::ConnectFailed
        })
    }

    fn connection_status(&mut self) -> LinkStatus {
        match self.controller.is_connected() {
            Ok(true) => LinkStatus::Connected,
            Ok(false) if self.connect_requested => LinkStatus::Connecting,
            Ok(false) => LinkStatus::Disconnected,
            Err(_) => LinkStatus::ConnectFailed,
        }
    }

    fn scan_networks(&mut self) -> Result<ScanResults, NetworkError> {
        let found = self
            .controller
            .scan_with_config(ScanConfig::default())
            .map_err(|e| {
                warn!("WiFi: Scan failed: {}", Debug2Format(&e));
                NetworkError::ScanFailed
            })?;

        let mut results = ScanResults::new();
        for ap in found.iter().filter(|ap| !ap.ssid.is_empty()) {
            let Ok(ssid) = ap.ssid.as_str().try_into() else {
                continue;
            };
            let entry = ScanEntry {
                ssid,
                rssi: i32::from(ap.signal_strength),
                auth_mode: auth_mode(ap.auth_method),
            };
            if results.push(entry).is_err() {
                break;
            }
        }

        info!("WiFi: Found {} access points", results.len());
        Ok(results)
    }

    fn set_auto_reconnect(&mut self, enabled: bool) {
        // esp-radio verbindet nie selbstständig neu; das Flag dokumentiert nur
        // die Erwartung der Zustandsmaschine
        self.auto_reconnect = enabled;
    }
}
