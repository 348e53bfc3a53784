// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen

// ============================================================================
// LED Konfiguration
// ============================================================================

/// Helligkeits-Skalierung für die Status-LED (0-255)
/// Farben aus der API werden auf diesen Wert herunterskaliert
pub const LED_BRIGHTNESS: u8 = 64;

/// RMT Taktfrequenz in MHz
/// 80 MHz ist optimal für WS2812 LED-Timing
pub const RMT_CLOCK_MHZ: u32 = 80;

/// Abstand zwischen zwei `tick()` Aufrufen der Status-LED
/// Muss deutlich unter der kürzesten Blink-Phase liegen
pub const INDICATOR_TICK_MS: u64 = 20;

// ============================================================================
// WiFi / Provisionierung
// ============================================================================

/// SSID des Provisionierungs-Access-Points
/// Kann über PROVISIONING_AP_SSID in .env überschrieben werden
pub const PROVISIONING_AP_SSID: &str = match option_env!("PROVISIONING_AP_SSID") {
    Some(ssid) => ssid,
    None => "M5Stack_Atom",
};

/// Passwort des Provisionierungs-Access-Points (WPA2, mind. 8 Zeichen)
/// Kann über PROVISIONING_AP_PASSWORD in .env überschrieben werden
pub const PROVISIONING_AP_PASSWORD: &str = match option_env!("PROVISIONING_AP_PASSWORD") {
    Some(password) => password,
    None => "66666666",
};

/// Statische Adresse des Access-Point Interfaces
pub const AP_IP: [u8; 4] = [192, 168, 4, 1];

/// Präfix-Länge des Access-Point Netzes (/24)
pub const AP_PREFIX_LEN: u8 = 24;

/// Status-Abfragen pro Verbindungsversuch (× Poll-Delay = maximale Wartezeit)
pub const CONNECT_MAX_ATTEMPTS: u32 = 200;

/// Pause zwischen zwei Status-Abfragen in Millisekunden
pub const CONNECT_POLL_DELAY_MS: u32 = 50;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

// ============================================================================
// Flash Konfiguration
// ============================================================================

/// Offset der "netcfg" Partition (siehe partitions.csv)
///
/// Gilt nur mit der eigenen Partitionstabelle: espflash braucht
/// `--partition-table esp-firmware/partitions.csv` (Runner in .cargo/config.toml).
/// Mit der Standard-Tabelle läge der Offset in der App-Partition.
pub const NETCFG_PARTITION_OFFSET: u32 = 0x3F_0000;

/// Größe eines Flash-Sektors (kleinste löschbare Einheit)
pub const FLASH_SECTOR_SIZE: u32 = 4096;

// ============================================================================
// DHCP-Server Konfiguration (nur Access Point)
// ============================================================================

/// Erste und letzte vergebene Adresse
pub const DHCP_RANGE_START: [u8; 4] = [192, 168, 4, 50];
pub const DHCP_RANGE_END: [u8; 4] = [192, 168, 4, 200];

/// DHCP Server- und Client-Port
pub const DHCP_SERVER_PORT: u16 = 67;
pub const DHCP_CLIENT_PORT: u16 = 68;

/// Buffer-Größe für DHCP-Pakete in Bytes
pub const DHCP_BUFFER_SIZE: usize = 600;

// ============================================================================
// mDNS-Konfiguration
// ============================================================================

/// mDNS Hostname (ohne .local suffix)
/// Der ESP32 wird erreichbar sein unter: <MDNS_HOSTNAME>.local
pub const MDNS_HOSTNAME: &str = match option_env!("MDNS_HOSTNAME") {
    Some(hostname) => hostname,
    None => "m5",
};

/// mDNS TTL (Time To Live) in Sekunden
pub const MDNS_TTL_SECS: u32 = 120;

/// Wartezeit nach Fehler vor erneutem Versuch
pub const MDNS_RECONNECT_DELAY_SECS: u64 = 5;

/// mDNS Port (Standard: 5353, RFC 6762)
pub const MDNS_PORT: u16 = 5353;

/// mDNS IPv4 Multicast-Adresse (224.0.0.251)
pub const MDNS_MULTICAST_ADDR: [u8; 4] = [224, 0, 0, 251];

/// UDP Buffer-Größen für mDNS (TX, RX in Bytes)
pub const MDNS_UDP_BUFFER_SIZE: usize = 512;

/// mDNS Receive/Send Buffer-Größen in Bytes (Standard MTU)
pub const MDNS_PACKET_BUFFER_SIZE: usize = 1500;

// ============================================================================
// HTTP Server Konfiguration
// ============================================================================

/// HTTP Port
pub const HTTP_PORT: u16 = 80;

/// HTTP-Tasks pro Netzwerk-Interface
pub const HTTP_TASKS_PER_STACK: usize = 2;

/// HTTP Buffer-Größe in Bytes
/// Für Request-Header und Body (POST /api/wifi ist < 256 Bytes)
pub const HTTP_BUFFER_SIZE: usize = 2048;

/// TCP RX Buffer-Größe in Bytes
pub const TCP_RX_BUFFER_SIZE: usize = 1024;

/// TCP TX Buffer-Größe in Bytes
pub const TCP_TX_BUFFER_SIZE: usize = 1024;
