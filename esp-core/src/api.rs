//! HTTP Control-API
//!
//! Transport-unabhängige Handler für `/api/led` und `/api/wifi`. Die
//! Firmware übergibt den rohen Request-Body und schreibt die
//! [`ApiResponse`] zurück; Routing, 404 und 405 erledigt der HTTP-Server.
//!
//! Die Handler enthalten keine Entscheidungslogik: Farbe setzen geht an die
//! Status-LED, Zugangsdaten an den [`Provisioner`](crate::provisioning::Provisioner).

use core::fmt::{self, Write};

use embedded_hal::delay::DelayNs;
use heapless::{String, Vec};
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::app::DeviceContext;
use crate::error::ValidationError;
use crate::logic::HEX_COLOR_LEN;
use crate::traits::{Clock, CredentialStore, NetworkDriver, PixelSink};
use crate::types::{HexColor, MAX_PASSWORD_LEN, MAX_SCAN_RESULTS, MAX_SSID_LEN, NetworkCredentials};

/// Maximale Größe eines Response-Bodys
pub const BODY_CAPACITY: usize = 2048;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Puffer für JSON-Strings mit Escape-Sequenzen (z.B. `\"` oder `\\`)
const UNESCAPE_BUFFER_SIZE: usize = 2 * MAX_PASSWORD_LEN;

/// Antwort eines API-Handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String<BODY_CAPACITY>,
}

impl ApiResponse {
    /// 200 mit JSON-Body
    fn json<T: Serialize>(value: &T) -> Result<Self, serde_json_core::ser::Error> {
        let mut buffer: Vec<u8, BODY_CAPACITY> = Vec::new();
        buffer
            .resize_default(BODY_CAPACITY)
            .map_err(|_| serde_json_core::ser::Error::BufferFull)?;
        let len = serde_json_core::to_slice(value, &mut buffer)?;
        buffer.truncate(len);

        // serde-json-core schreibt nur gültiges UTF-8
        let body = String::from_utf8(buffer).map_err(|_| serde_json_core::ser::Error::BufferFull)?;

        Ok(Self {
            status: STATUS_OK,
            content_type: CONTENT_TYPE_JSON,
            body,
        })
    }

    /// Plain-Text Antwort mit Begründung
    fn text(status: u16, reason: &dyn core::fmt::Display) -> Self {
        let mut body = String::new();
        // Alle Begründungen sind deutlich kürzer als BODY_CAPACITY
        let _ = write!(body, "{}", reason);
        Self {
            status,
            content_type: CONTENT_TYPE_TEXT,
            body,
        }
    }

    fn bad_request(reason: &dyn core::fmt::Display) -> Self {
        Self::text(STATUS_BAD_REQUEST, reason)
    }

    fn internal_error() -> Self {
        Self::text(STATUS_INTERNAL_ERROR, &"Response too large")
    }
}

#[derive(Serialize)]
struct LedState {
    color: HexColor,
}

#[derive(Deserialize)]
struct LedRequest {
    color: Option<Bounded<HEX_COLOR_LEN>>,
}

#[derive(Serialize)]
struct NetworkInfo<'a> {
    ssid: &'a str,
    rssi: i32,
}

#[derive(Serialize)]
struct WifiState<'a> {
    ssid: &'a str,
    pass: &'a str,
    token: &'a str,
    networks: &'a [NetworkInfo<'a>],
}

#[derive(Deserialize)]
struct WifiRequest {
    ssid: Option<Bounded<MAX_SSID_LEN>>,
    pass: Option<Bounded<MAX_PASSWORD_LEN>>,
}

/// String-Feld mit Längengrenze, bereits ohne Escape-Sequenzen
///
/// Zu lange Werte sind kein JSON-Fehler, sondern werden als
/// [`ValidationError::FieldTooLong`] gemeldet.
enum Bounded<const N: usize> {
    Value(String<N>),
    TooLong,
}

impl<const N: usize> Bounded<N> {
    fn into_value(self, field: &'static str) -> Result<String<N>, ValidationError> {
        match self {
            Bounded::Value(value) => Ok(value),
            Bounded::TooLong => Err(ValidationError::FieldTooLong(field)),
        }
    }
}

impl<'de, const N: usize> Deserialize<'de> for Bounded<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BoundedVisitor<const N: usize>;

        impl<const N: usize> Visitor<'_> for BoundedVisitor<N> {
            type Value = Bounded<N>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a string of at most {} bytes", N)
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Bounded<N>, E> {
                Ok(String::try_from(value).map_or(Bounded::TooLong, Bounded::Value))
            }
        }

        deserializer.deserialize_str(BoundedVisitor::<N>)
    }
}

#[derive(Serialize)]
struct UpdateStatus {
    status: &'static str,
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ValidationError> {
    if body.is_empty() {
        return Err(ValidationError::MissingBody);
    }
    let mut unescape_buffer = [0u8; UNESCAPE_BUFFER_SIZE];
    serde_json_core::from_slice_escaped::<T>(body, &mut unescape_buffer)
        .map(|(value, _)| value)
        .map_err(|_| ValidationError::InvalidJson)
}

fn parse_led_request(body: &[u8]) -> Result<HexColor, ValidationError> {
    let request: LedRequest = parse_body(body)?;
    match request.color {
        Some(Bounded::Value(color)) => color.parse(),
        Some(Bounded::TooLong) => Err(ValidationError::InvalidColor),
        None => Err(ValidationError::MissingField("color")),
    }
}

fn parse_wifi_request(body: &[u8]) -> Result<NetworkCredentials, ValidationError> {
    let request: WifiRequest = parse_body(body)?;
    let ssid = request
        .ssid
        .ok_or(ValidationError::MissingField("ssid"))?
        .into_value("ssid")?;
    if ssid.is_empty() {
        return Err(ValidationError::MissingField("ssid"));
    }
    let password = match request.pass {
        Some(pass) => pass.into_value("pass")?,
        None => String::new(),
    };

    // Token wird beim Speichern verworfen
    Ok(NetworkCredentials {
        ssid,
        password,
        token: String::new(),
    })
}

/// `GET /api/led` → `{"color":"#RRGGBB"}` (An-Farbe des aktuellen Musters)
pub fn get_led<P, C, N, S, D>(device: &DeviceContext<P, C, N, S, D>) -> ApiResponse
where
    P: PixelSink,
    C: Clock,
    N: NetworkDriver,
    S: CredentialStore,
    D: DelayNs,
{
    let color = HexColor(device.indicator().pattern().on_color());
    ApiResponse::json(&LedState { color }).unwrap_or_else(|_| ApiResponse::internal_error())
}

/// `POST /api/led` mit `{"color":"#RRGGBB"}` → feste Farbe
pub fn post_led<P, C, N, S, D>(device: &mut DeviceContext<P, C, N, S, D>, body: &[u8]) -> ApiResponse
where
    P: PixelSink,
    C: Clock,
    N: NetworkDriver,
    S: CredentialStore,
    D: DelayNs,
{
    let color = match parse_led_request(body) {
        Ok(color) => color,
        Err(e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("HTTP: Rejected LED update: {}", e);
            return ApiResponse::bad_request(&e);
        }
    };

    #[cfg(feature = "defmt")]
    defmt::info!("HTTP: LED color set to {}", color);

    device.indicator_mut().set_solid(color.0);
    ApiResponse::json(&LedState { color }).unwrap_or_else(|_| ApiResponse::internal_error())
}

/// `GET /api/wifi` → gespeicherte Zugangsdaten und sichtbare Netzwerke
///
/// Versteckte Netzwerke (leere SSID) werden ausgelassen. Passt die Antwort
/// nicht in [`BODY_CAPACITY`], werden die schwächsten Netzwerke verworfen.
pub fn get_wifi<P, C, N, S, D>(device: &mut DeviceContext<P, C, N, S, D>) -> ApiResponse
where
    P: PixelSink,
    C: Clock,
    N: NetworkDriver,
    S: CredentialStore,
    D: DelayNs,
{
    let provisioner = device.provisioner_mut();
    let credentials = provisioner.stored_credentials();
    let scan = provisioner.scan_networks();

    let mut networks: Vec<NetworkInfo, MAX_SCAN_RESULTS> = scan
        .iter()
        .filter(|entry| !entry.ssid.is_empty())
        .map(|entry| NetworkInfo {
            ssid: entry.ssid.as_str(),
            rssi: entry.rssi,
        })
        .collect();
    networks.sort_unstable_by(|a, b| b.rssi.cmp(&a.rssi));

    loop {
        let state = WifiState {
            ssid: &credentials.ssid,
            pass: &credentials.password,
            token: &credentials.token,
            networks: &networks,
        };
        match ApiResponse::json(&state) {
            Ok(response) => return response,
            Err(_) if networks.pop().is_some() => continue,
            Err(_) => return ApiResponse::internal_error(),
        }
    }
}

/// `POST /api/wifi` mit `{"ssid":"...","pass":"..."}`
///
/// Löscht die alten Zugangsdaten und speichert die neuen. Verbindet nicht
/// sofort, die Daten wirken beim nächsten Boot.
pub fn post_wifi<P, C, N, S, D>(device: &mut DeviceContext<P, C, N, S, D>, body: &[u8]) -> ApiResponse
where
    P: PixelSink,
    C: Clock,
    N: NetworkDriver,
    S: CredentialStore,
    D: DelayNs,
{
    let credentials = match parse_wifi_request(body) {
        Ok(credentials) => credentials,
        Err(e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("HTTP: Rejected WiFi update: {}", e);
            return ApiResponse::bad_request(&e);
        }
    };

    let (indicator, provisioner) = device.split_mut();
    match provisioner.update_credentials(&credentials, indicator) {
        Ok(()) => ApiResponse::json(&UpdateStatus { status: "success" })
            .unwrap_or_else(|_| ApiResponse::internal_error()),
        Err(e) => ApiResponse::bad_request(&e),
    }
}
