//! Integration Tests für die HTTP Control-API
//!
//! Handler werden direkt mit rohen Request-Bodies aufgerufen.

mod common;

use common::{ManualClock, MemoryCredentialStore, MockNetwork, test_device};
use esp_core::api::{self, CONTENT_TYPE_JSON, CONTENT_TYPE_TEXT};
use esp_core::indicator::IndicatorPattern;
use esp_core::types::{BLUE, ConnectionState, NetworkCredentials};
use rgb::RGB8;

// ============================================================================
// Tests: /api/led
// ============================================================================

#[test]
fn test_get_led_reports_black_when_off() {
    let clock = ManualClock::new();
    let device = test_device(&clock, MockNetwork::new(), MemoryCredentialStore::new());

    let response = api::get_led(&device);
    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, CONTENT_TYPE_JSON);
    assert_eq!(response.body.as_str(), r##"{"color":"#000000"}"##);
}

#[test]
fn test_get_led_reports_blink_on_color() {
    let clock = ManualClock::new();
    let mut device = test_device(&clock, MockNetwork::new(), MemoryCredentialStore::new());
    device.boot();

    // Provisionierung blinkt orange
    let response = api::get_led(&device);
    assert_eq!(response.body.as_str(), r##"{"color":"#FFA500"}"##);
}

#[test]
fn test_post_led_sets_solid_color() {
    let clock = ManualClock::new();
    let mut device = test_device(&clock, MockNetwork::new(), MemoryCredentialStore::new());

    let response = api::post_led(&mut device, br##"{"color":"#1a2b3c"}"##);

    assert_eq!(response.status, 200);
    assert_eq!(response.body.as_str(), r##"{"color":"#1A2B3C"}"##);
    let color = RGB8 {
        r: 0x1A,
        g: 0x2B,
        b: 0x3C,
    };
    assert_eq!(*device.indicator().pattern(), IndicatorPattern::Solid(color));
    assert_eq!(device.indicator().sink().last_color(), Some(color));

    let response = api::get_led(&device);
    assert_eq!(response.body.as_str(), r##"{"color":"#1A2B3C"}"##);
}

#[test]
fn test_post_led_rejects_named_color() {
    let clock = ManualClock::new();
    let mut device = test_device(&clock, MockNetwork::new(), MemoryCredentialStore::new());
    device.indicator_mut().set_solid(BLUE);

    let response = api::post_led(&mut device, br#"{"color":"blue"}"#);

    assert_eq!(response.status, 400);
    assert_eq!(response.content_type, CONTENT_TYPE_TEXT);
    assert_eq!(*device.indicator().pattern(), IndicatorPattern::Solid(BLUE));
    assert_eq!(device.indicator().sink().write_count(), 1);
}

#[test]
fn test_post_led_rejects_malformed_requests() {
    let clock = ManualClock::new();
    let mut device = test_device(&clock, MockNetwork::new(), MemoryCredentialStore::new());

    let cases: [(&[u8], &str); 6] = [
        (b"", "Missing body"),
        (b"color=#112233", "Invalid JSON"),
        (b"{}", "Missing 'color'"),
        (br##"{"color":"#12345"}"##, "Expect color like \"#RRGGBB\""),
        (br##"{"color":"#1234567"}"##, "Expect color like \"#RRGGBB\""),
        (br##"{"color":"#12345G"}"##, "Expect color like \"#RRGGBB\""),
    ];
    for (body, reason) in cases {
        let response = api::post_led(&mut device, body);
        assert_eq!(response.status, 400);
        assert_eq!(response.body.as_str(), reason);
    }
    assert_eq!(*device.indicator().pattern(), IndicatorPattern::Off);
    assert_eq!(device.indicator().sink().write_count(), 0);
}

// ============================================================================
// Tests: /api/wifi
// ============================================================================

#[test]
fn test_get_wifi_reports_credentials_and_networks() {
    let clock = ManualClock::new();
    let network = MockNetwork::with_networks(&[("Cafe", -80), ("", -40), ("Home", -55)]);
    let mut device = test_device(&clock, network, MemoryCredentialStore::with("Home", "pw", "tok"));

    let response = api::get_wifi(&mut device);

    assert_eq!(response.status, 200);
    assert_eq!(
        response.body.as_str(),
        r#"{"ssid":"Home","pass":"pw","token":"tok","networks":[{"ssid":"Home","rssi":-55},{"ssid":"Cafe","rssi":-80}]}"#
    );
}

#[test]
fn test_get_wifi_without_credentials() {
    let clock = ManualClock::new();
    let mut device = test_device(&clock, MockNetwork::new(), MemoryCredentialStore::new());

    let response = api::get_wifi(&mut device);
    assert_eq!(
        response.body.as_str(),
        r#"{"ssid":"","pass":"","token":"","networks":[]}"#
    );
}

#[test]
fn test_get_wifi_degrades_on_failures() {
    let clock = ManualClock::new();
    let mut network = MockNetwork::with_networks(&[("Cafe", -80)]);
    network.fail_scan = true;
    let mut store = MemoryCredentialStore::with("Home", "pw", "");
    store.fail_load = true;
    let mut device = test_device(&clock, network, store);

    let response = api::get_wifi(&mut device);
    assert_eq!(response.status, 200);
    assert_eq!(
        response.body.as_str(),
        r#"{"ssid":"","pass":"","token":"","networks":[]}"#
    );
}

#[test]
fn test_post_wifi_replaces_credentials() {
    let clock = ManualClock::new();
    let mut device = test_device(
        &clock,
        MockNetwork::new(),
        MemoryCredentialStore::with("Old", "old-pass", "old-token"),
    );

    let response = api::post_wifi(&mut device, br#"{"ssid":"Office","pass":"secret123"}"#);

    assert_eq!(response.status, 200);
    assert_eq!(response.body.as_str(), r#"{"status":"success"}"#);

    let store = device.provisioner().store();
    assert_eq!(
        store.stored,
        Some(NetworkCredentials::new("Office", "secret123", "").unwrap())
    );
    assert_eq!(store.clear_count, 1);

    // Kein Verbindungsversuch über die API
    assert_eq!(device.provisioner().network().station_connects(), 0);
}

#[test]
fn test_post_wifi_stores_unescaped_values() {
    let clock = ManualClock::new();
    let mut device = test_device(&clock, MockNetwork::new(), MemoryCredentialStore::new());

    let body = r#"{"ssid":"Café","pass":"se\"cret\\1"}"#;
    let response = api::post_wifi(&mut device, body.as_bytes());

    assert_eq!(response.status, 200);
    assert_eq!(
        device.provisioner().store().stored,
        Some(NetworkCredentials::new("Café", "se\"cret\\1", "").unwrap())
    );

    // Beim Auslesen wird genau einmal escaped
    let response = api::get_wifi(&mut device);
    assert!(
        response
            .body
            .as_str()
            .starts_with(r#"{"ssid":"Café","pass":"se\"cret\\1","token":"""#)
    );
}

#[test]
fn test_post_wifi_password_is_optional() {
    let clock = ManualClock::new();
    let mut device = test_device(&clock, MockNetwork::new(), MemoryCredentialStore::new());
    device.boot();

    let response = api::post_wifi(&mut device, br#"{"ssid":"Guest"}"#);

    assert_eq!(response.status, 200);
    assert_eq!(device.state(), ConnectionState::ProvisioningMode);
    assert_eq!(
        device.provisioner().store().stored,
        Some(NetworkCredentials::new("Guest", "", "").unwrap())
    );
}

#[test]
fn test_post_wifi_requires_ssid() {
    let clock = ManualClock::new();
    let mut device = test_device(
        &clock,
        MockNetwork::new(),
        MemoryCredentialStore::with("Home", "pw", ""),
    );

    let response = api::post_wifi(&mut device, br#"{"pass":"secret"}"#);

    assert_eq!(response.status, 400);
    assert_eq!(response.body.as_str(), "Missing 'ssid'");
    // Ungültige Requests ändern nichts
    let store = device.provisioner().store();
    assert_eq!(store.clear_count, 0);
    assert_eq!(store.stored.as_ref().map(|c| c.ssid.as_str()), Some("Home"));
}

#[test]
fn test_post_wifi_reports_storage_failure() {
    let clock = ManualClock::new();
    let mut store = MemoryCredentialStore::new();
    store.fail_save = true;
    let mut device = test_device(&clock, MockNetwork::new(), store);

    let response = api::post_wifi(&mut device, br#"{"ssid":"Office","pass":"secret123"}"#);

    assert_eq!(response.status, 400);
    assert_eq!(response.content_type, CONTENT_TYPE_TEXT);
    assert_eq!(
        response.body.as_str(),
        "Failed to save credentials: Storage driver error"
    );
}

#[test]
fn test_post_wifi_rejects_too_long_password() {
    let clock = ManualClock::new();
    let mut device = test_device(&clock, MockNetwork::new(), MemoryCredentialStore::new());

    let body = format!(r#"{{"ssid":"Office","pass":"{}"}}"#, "p".repeat(65));
    let response = api::post_wifi(&mut device, body.as_bytes());

    assert_eq!(response.status, 400);
    assert_eq!(response.body.as_str(), "Field 'pass' too long");
    assert_eq!(device.provisioner().store().save_count, 0);
}
