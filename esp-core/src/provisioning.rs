//! Provisionierungs-Zustandsmaschine
//!
//! Die Entscheidungslogik steckt in der reinen Funktion [`transition`]:
//! `(Zustand, Ereignis) -> (Zustand, Effekte)`. Der [`Provisioner`] führt die
//! Effekte gegen Treiber, Speicher und Status-LED aus und speist Folge-
//! Ereignisse wieder ein.
//!
//! | Zustand          | Ereignis                  | Folgezustand     |
//! |------------------|---------------------------|------------------|
//! | Idle             | Boot (keine Zugangsdaten) | ProvisioningMode |
//! | Idle             | Boot (Zugangsdaten)       | OperationMode    |
//! | OperationMode    | StationStarted            | OperationAwait   |
//! | OperationAwait   | LinkUp                    | Connected        |
//! | OperationAwait   | ConnectTimeout            | ProvisioningMode |
//! | ProvisioningMode | CredentialsSaved          | ProvisioningMode |
//!
//! Alle anderen Kombinationen lassen den Zustand unverändert.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::error::{ConnectTimeout, UpdateError};
use crate::indicator::{BlinkPattern, IndicatorPattern, StatusIndicator};
use crate::traits::{Clock, CredentialStore, NetworkDriver, PixelSink};
use crate::types::{
    BLUE, ConnectionState, GREEN, LinkStatus, NetworkCredentials, ORANGE, ScanResults, WifiMode,
};

/// Standard-Anzahl der Status-Abfragen pro Verbindungsversuch
pub const DEFAULT_MAX_ATTEMPTS: u32 = 200;

/// Standard-Pause zwischen zwei Status-Abfragen in Millisekunden
pub const DEFAULT_POLL_DELAY_MS: u32 = 50;

/// Maximale Anzahl Effekte pro Übergang
pub const MAX_EFFECTS: usize = 3;

/// Ereignisse der Zustandsmaschine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Gerät gestartet; ob nutzbare Zugangsdaten vorhanden sind
    Boot { has_credentials: bool },
    /// Station-Modus konfiguriert, Verbindung angestoßen
    StationStarted,
    /// Treiber meldet eine Verbindung
    LinkUp,
    /// Versuchs-Limit überschritten
    ConnectTimeout,
    /// Neue Zugangsdaten wurden über die API gespeichert
    CredentialsSaved,
}

/// Seiteneffekte eines Übergangs, ausgeführt vom Aufrufer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// AP+STA-Modus, Provisionierungs-Access-Point starten
    StartAccessPoint,
    /// Zugangsdaten laden, Station-Modus setzen, Auto-Reconnect aus, verbinden
    ConnectStation,
    /// Begrenzte Warteschleife auf die Verbindung
    AwaitConnection,
    /// Gespeicherte Zugangsdaten löschen
    ClearCredentials,
    /// Anzeigemuster der Status-LED setzen
    Indicate(IndicatorPattern),
}

/// Ergebnis von [`transition`]
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: ConnectionState,
    pub effects: Vec<Effect, MAX_EFFECTS>,
}

impl Transition {
    fn to(next: ConnectionState, effects: &[Effect]) -> Self {
        Self {
            next,
            // MAX_EFFECTS deckt jeden Übergang der Tabelle ab
            effects: Vec::from_slice(effects).unwrap_or_default(),
        }
    }

    fn stay(state: ConnectionState) -> Self {
        Self::to(state, &[])
    }
}

/// Blinkt orange: Access Point aktiv, wartet auf Zugangsdaten
pub fn provisioning_pattern() -> IndicatorPattern {
    IndicatorPattern::Blink(BlinkPattern::with_defaults(ORANGE))
}

/// Blinkt blau: Verbindungsaufbau läuft
pub fn connecting_pattern() -> IndicatorPattern {
    IndicatorPattern::Blink(BlinkPattern::with_defaults(BLUE))
}

/// Leuchtet grün: verbunden
pub fn connected_pattern() -> IndicatorPattern {
    IndicatorPattern::Solid(GREEN)
}

/// Übergangsfunktion der Zustandsmaschine (total, ohne Seiteneffekte)
pub fn transition(state: ConnectionState, event: Event) -> Transition {
    use ConnectionState::*;

    match (state, event) {
        (Idle, Event::Boot { has_credentials: false }) => Transition::to(
            ProvisioningMode,
            &[
                Effect::StartAccessPoint,
                Effect::Indicate(provisioning_pattern()),
            ],
        ),
        (Idle, Event::Boot { has_credentials: true }) => Transition::to(
            OperationMode,
            &[
                Effect::Indicate(connecting_pattern()),
                Effect::ConnectStation,
            ],
        ),
        (OperationMode, Event::StationStarted) => {
            Transition::to(OperationAwait, &[Effect::AwaitConnection])
        }
        (OperationAwait, Event::LinkUp) => {
            Transition::to(Connected, &[Effect::Indicate(connected_pattern())])
        }
        (OperationAwait, Event::ConnectTimeout) => Transition::to(
            ProvisioningMode,
            &[
                Effect::ClearCredentials,
                Effect::StartAccessPoint,
                Effect::Indicate(provisioning_pattern()),
            ],
        ),
        // Zugangsdaten wirken erst beim nächsten Boot, kein AP-Neustart
        (ProvisioningMode, Event::CredentialsSaved) => Transition::stay(ProvisioningMode),
        (state, _) => Transition::stay(state),
    }
}

/// Richtlinie für Access Point und Verbindungsversuche
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisioningConfig {
    pub ap_ssid: &'static str,
    pub ap_password: &'static str,
    /// Maximale Anzahl Status-Abfragen pro Verbindungsversuch
    pub max_attempts: u32,
    /// Pause zwischen zwei Status-Abfragen
    pub poll_delay_ms: u32,
}

impl ProvisioningConfig {
    pub const fn new(ap_ssid: &'static str, ap_password: &'static str) -> Self {
        Self {
            ap_ssid,
            ap_password,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            poll_delay_ms: DEFAULT_POLL_DELAY_MS,
        }
    }

    /// Längste mögliche Wartezeit eines Verbindungsversuchs
    pub fn worst_case_wait_ms(&self) -> u64 {
        u64::from(self.max_attempts) * u64::from(self.poll_delay_ms)
    }
}

/// Wartet begrenzt auf eine Verbindung der Station
///
/// Fragt den Treiber höchstens `max_attempts` mal ab und ruft nach jeder
/// Abfrage `tick()` der Status-LED auf, damit das Blinken weiterläuft.
/// Terminiert unabhängig vom Treiber-Verhalten.
///
/// Gibt die Anzahl der Abfragen bis zur Verbindung zurück.
pub fn await_connection<N, D, P, C>(
    network: &mut N,
    delay: &mut D,
    indicator: &mut StatusIndicator<P, C>,
    max_attempts: u32,
    poll_delay_ms: u32,
) -> Result<u32, ConnectTimeout>
where
    N: NetworkDriver,
    D: DelayNs,
    P: PixelSink,
    C: Clock,
{
    for attempt in 1..=max_attempts {
        let status = network.connection_status();
        indicator.tick();

        if status == LinkStatus::Connected {
            return Ok(attempt);
        }
        if attempt < max_attempts {
            delay.delay_ms(poll_delay_ms);
        }
    }

    Err(ConnectTimeout {
        attempts: max_attempts,
    })
}

/// Führt die Zustandsmaschine gegen Treiber und Speicher aus
///
/// Besitzt den einzigen [`ConnectionState`] des Geräts. Zustandswechsel
/// passieren nur über [`Provisioner::boot`] und
/// [`Provisioner::update_credentials`].
pub struct Provisioner<N, S, D> {
    network: N,
    store: S,
    delay: D,
    config: ProvisioningConfig,
    state: ConnectionState,
    /// Transiente Kopie der Zugangsdaten für den laufenden Verbindungsversuch
    pending: Option<NetworkCredentials>,
}

impl<N, S, D> Provisioner<N, S, D>
where
    N: NetworkDriver,
    S: CredentialStore,
    D: DelayNs,
{
    pub fn new(network: N, store: S, delay: D, config: ProvisioningConfig) -> Self {
        Self {
            network,
            store,
            delay,
            config,
            state: ConnectionState::Idle,
            pending: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn config(&self) -> &ProvisioningConfig {
        &self.config
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Boot: Zugangsdaten prüfen und Provisionierung oder Betrieb starten
    ///
    /// Blockiert im Betriebs-Zweig höchstens `max_attempts × poll_delay_ms`.
    /// Endet immer in `ProvisioningMode` oder `Connected`.
    pub fn boot<P: PixelSink, C: Clock>(
        &mut self,
        indicator: &mut StatusIndicator<P, C>,
    ) -> ConnectionState {
        self.pending = self.load_credentials();
        let has_credentials = self.pending.is_some();
        self.dispatch(Event::Boot { has_credentials }, indicator);
        self.state
    }

    /// Löscht die gespeicherten Zugangsdaten und speichert neue
    ///
    /// Löst keinen Verbindungsversuch aus; die Daten wirken beim nächsten Boot.
    pub fn update_credentials<P: PixelSink, C: Clock>(
        &mut self,
        credentials: &NetworkCredentials,
        indicator: &mut StatusIndicator<P, C>,
    ) -> Result<(), UpdateError> {
        self.store.clear().inspect_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::error!("Provisioning: Failed to clear credentials: {}", _e);
        })?;
        self.store.save(credentials).inspect_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::error!("Provisioning: Failed to save credentials: {}", _e);
        })?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Provisioning: Credentials for '{}' saved",
            credentials.ssid.as_str()
        );

        self.dispatch(Event::CredentialsSaved, indicator);
        Ok(())
    }

    /// Gespeicherte Zugangsdaten (leer bei Fehler oder wenn keine vorhanden)
    pub fn stored_credentials(&mut self) -> NetworkCredentials {
        self.load_credentials().unwrap_or_default()
    }

    /// Scannt sichtbare Netzwerke; Fehler ergeben eine leere Liste
    pub fn scan_networks(&mut self) -> ScanResults {
        match self.network.scan_networks() {
            Ok(networks) => networks,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Provisioning: Scan failed: {}", _e);
                ScanResults::new()
            }
        }
    }

    fn load_credentials(&mut self) -> Option<NetworkCredentials> {
        match self.store.load() {
            Ok(credentials) => credentials.filter(NetworkCredentials::has_ssid),
            Err(_e) => {
                // Lesefehler wird wie "keine Zugangsdaten" behandelt
                #[cfg(feature = "defmt")]
                defmt::error!("Provisioning: Failed to load credentials: {}", _e);
                None
            }
        }
    }

    fn dispatch<P: PixelSink, C: Clock>(
        &mut self,
        event: Event,
        indicator: &mut StatusIndicator<P, C>,
    ) {
        let mut next_event = Some(event);

        while let Some(event) = next_event.take() {
            let Transition { next, effects } = transition(self.state, event);

            log_transition(self.state, event, next);
            self.state = next;

            for effect in effects {
                if let Some(follow_up) = self.execute(effect, indicator) {
                    next_event = Some(follow_up);
                }
            }
        }
    }

    fn execute<P: PixelSink, C: Clock>(
        &mut self,
        effect: Effect,
        indicator: &mut StatusIndicator<P, C>,
    ) -> Option<Event> {
        match effect {
            Effect::Indicate(pattern) => {
                indicator.set_pattern(pattern);
                None
            }
            Effect::StartAccessPoint => {
                self.start_access_point();
                None
            }
            Effect::ClearCredentials => {
                if let Err(_e) = self.store.clear() {
                    #[cfg(feature = "defmt")]
                    defmt::error!("Provisioning: Failed to clear credentials: {}", _e);
                }
                None
            }
            Effect::ConnectStation => {
                self.connect_station();
                Some(Event::StationStarted)
            }
            Effect::AwaitConnection => {
                let result = await_connection(
                    &mut self.network,
                    &mut self.delay,
                    indicator,
                    self.config.max_attempts,
                    self.config.poll_delay_ms,
                );
                self.pending = None;

                match result {
                    Ok(_attempts) => {
                        #[cfg(feature = "defmt")]
                        defmt::info!("Provisioning: Connected after {} polls", _attempts);
                        Some(Event::LinkUp)
                    }
                    Err(_timeout) => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!(
                            "Provisioning: No connection after {} polls, falling back to access point",
                            _timeout.attempts
                        );
                        Some(Event::ConnectTimeout)
                    }
                }
            }
        }
    }

    fn start_access_point(&mut self) {
        let ssid = self.config.ap_ssid;
        let password = self.config.ap_password;

        // AP+STA, damit Netzwerk-Scans im Provisionierungs-Modus funktionieren
        let result = self
            .network
            .set_mode(WifiMode::AccessPointStation)
            .and_then(|()| self.network.start_access_point(ssid, password));

        match result {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                defmt::info!("Provisioning: Access point '{}' started", ssid);
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::error!("Provisioning: Failed to start access point: {}", _e);
            }
        }
    }

    fn connect_station(&mut self) {
        // Normalerweise schon beim Boot geladen
        let Some(credentials) = self.pending.take().or_else(|| self.load_credentials()) else {
            return;
        };

        if let Err(_e) = self.network.set_mode(WifiMode::Station) {
            #[cfg(feature = "defmt")]
            defmt::error!("Provisioning: Failed to set station mode: {}", _e);
        }
        self.network.set_auto_reconnect(false);

        #[cfg(feature = "defmt")]
        defmt::info!("Provisioning: Connecting to '{}'", credentials.ssid.as_str());

        if let Err(_e) = self
            .network
            .begin_station_connect(&credentials.ssid, &credentials.password)
        {
            #[cfg(feature = "defmt")]
            defmt::error!("Provisioning: Failed to begin connection: {}", _e);
        }
        self.pending = Some(credentials);
    }
}

#[cfg(feature = "defmt")]
fn log_transition(from: ConnectionState, event: Event, to: ConnectionState) {
    if from != to {
        defmt::info!("Provisioning: {} --{}--> {}", from, event, to);
    }
}

#[cfg(not(feature = "defmt"))]
fn log_transition(_: ConnectionState, _: Event, _: ConnectionState) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_without_credentials() {
        let t = transition(ConnectionState::Idle, Event::Boot { has_credentials: false });
        assert_eq!(t.next, ConnectionState::ProvisioningMode);
        assert_eq!(
            t.effects.as_slice(),
            &[
                Effect::StartAccessPoint,
                Effect::Indicate(provisioning_pattern())
            ]
        );
    }

    #[test]
    fn test_boot_with_credentials() {
        let t = transition(ConnectionState::Idle, Event::Boot { has_credentials: true });
        assert_eq!(t.next, ConnectionState::OperationMode);
        assert_eq!(
            t.effects.as_slice(),
            &[Effect::Indicate(connecting_pattern()), Effect::ConnectStation]
        );
    }

    #[test]
    fn test_station_started_awaits() {
        let t = transition(ConnectionState::OperationMode, Event::StationStarted);
        assert_eq!(t.next, ConnectionState::OperationAwait);
        assert_eq!(t.effects.as_slice(), &[Effect::AwaitConnection]);
    }

    #[test]
    fn test_link_up_connects() {
        let t = transition(ConnectionState::OperationAwait, Event::LinkUp);
        assert_eq!(t.next, ConnectionState::Connected);
        assert_eq!(
            t.effects.as_slice(),
            &[Effect::Indicate(IndicatorPattern::Solid(GREEN))]
        );
    }

    #[test]
    fn test_timeout_falls_back() {
        let t = transition(ConnectionState::OperationAwait, Event::ConnectTimeout);
        assert_eq!(t.next, ConnectionState::ProvisioningMode);
        assert_eq!(
            t.effects.as_slice(),
            &[
                Effect::ClearCredentials,
                Effect::StartAccessPoint,
                Effect::Indicate(provisioning_pattern())
            ]
        );
    }

    #[test]
    fn test_credentials_saved_reenters_provisioning() {
        let t = transition(ConnectionState::ProvisioningMode, Event::CredentialsSaved);
        assert_eq!(t.next, ConnectionState::ProvisioningMode);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_unhandled_events_are_ignored() {
        let states = [
            ConnectionState::Idle,
            ConnectionState::ProvisioningMode,
            ConnectionState::ProvisioningAwait,
            ConnectionState::OperationMode,
            ConnectionState::OperationAwait,
            ConnectionState::Connected,
        ];
        for state in states {
            let t = transition(state, Event::CredentialsSaved);
            assert_eq!(t.next, state);
            assert!(t.effects.is_empty());
        }

        let t = transition(ConnectionState::Connected, Event::Boot { has_credentials: true });
        assert_eq!(t.next, ConnectionState::Connected);
        assert!(t.effects.is_empty());

        let t = transition(ConnectionState::ProvisioningMode, Event::LinkUp);
        assert_eq!(t.next, ConnectionState::ProvisioningMode);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_worst_case_wait() {
        let config = ProvisioningConfig::new("ap", "password");
        assert_eq!(config.worst_case_wait_ms(), 10_000);
    }
}
