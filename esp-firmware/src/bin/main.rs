// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

extern crate alloc;

use core::cell::RefCell;

use defmt::info;
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Ipv4Address, Ipv4Cidr, StackResources, StaticConfigV4};
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::rmt::PulseCode;
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use esp_hal_smartled::smart_led_buffer;
use esp_storage::FlashStorage;
use static_cell::StaticCell;

use {esp_backtrace as _, esp_println as _};

use esp_core::{DeviceContext, PersistentCredentialStore, ProvisioningConfig};
use esp_led_provisioning::config::{
    AP_IP, AP_PREFIX_LEN, CONNECT_MAX_ATTEMPTS, CONNECT_POLL_DELAY_MS, EXTRA_HEAP_SIZE,
    HTTP_TASKS_PER_STACK, LED_BRIGHTNESS, PROVISIONING_AP_PASSWORD, PROVISIONING_AP_SSID,
    RMT_CLOCK_MHZ, WIFI_HEAP_SIZE,
};
use esp_led_provisioning::hal::{
    EmbassyClock, EspFlashDriver, EspWifiDriver, LED_BUFFER_SIZE, RmtPixelSink,
};
use esp_led_provisioning::tasks::{
    dhcp_server_task, http_server_task, indicator_task, mdns_responder_task, net_task,
    station_ip_task,
};
use esp_led_provisioning::{DeviceCell, with_device};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
esp_bootloader_esp_idf::esp_app_desc!();

/// Sockets pro Stack: HTTP-Tasks + DHCP-Server bzw. mDNS
const SOCKETS_PER_STACK: usize = HTTP_TASKS_PER_STACK + 2;

/// Main Entry Point
///
/// Initialisiert Hardware und WiFi, entscheidet beim Boot zwischen
/// Provisionierungs- und Betriebsmodus und spawnt danach die Tasks.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Heap Allocator: reclaimed RAM + extra
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    // WiFi Hardware initialisieren
    static RADIO_INIT: StaticCell<esp_radio::Controller> = StaticCell::new();
    let radio_init =
        RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));

    let (wifi_controller, wifi_interfaces) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi");

    // Status-LED (WS2812 an GPIO8)
    static LED_BUFFER: StaticCell<[PulseCode; LED_BUFFER_SIZE]> = StaticCell::new();
    let led_buffer = LED_BUFFER.init(smart_led_buffer!(1));
    let pixel_sink = RmtPixelSink::new(
        peripherals.GPIO8,
        peripherals.RMT,
        RMT_CLOCK_MHZ,
        led_buffer,
        LED_BRIGHTNESS,
    )
    .expect("Failed to initialize RMT");

    // Zugangsdaten auf der "netcfg" Partition
    let store = PersistentCredentialStore::new(EspFlashDriver::new(FlashStorage::new(
        peripherals.FLASH,
    )));

    let provisioning = ProvisioningConfig {
        max_attempts: CONNECT_MAX_ATTEMPTS,
        poll_delay_ms: CONNECT_POLL_DELAY_MS,
        ..ProvisioningConfig::new(PROVISIONING_AP_SSID, PROVISIONING_AP_PASSWORD)
    };

    static DEVICE: StaticCell<DeviceCell> = StaticCell::new();
    let device: &'static DeviceCell = DEVICE.init(Mutex::new(RefCell::new(DeviceContext::new(
        pixel_sink,
        EmbassyClock,
        EspWifiDriver::new(wifi_controller),
        store,
        Delay::new(),
        provisioning,
    ))));

    // Boot: blockiert bis verbunden oder Access Point aktiv
    info!(
        "Boot: Connecting (max {} ms)...",
        provisioning.worst_case_wait_ms()
    );
    let state = with_device(device, |device| device.boot());
    info!("Boot: Finished in state {}", state);

    // Netzwerk-Stacks (Access Point statisch, Station per DHCP)
    let rng = Rng::new();
    let ap_seed = (rng.random() as u64) << 32 | rng.random() as u64;
    let sta_seed = (rng.random() as u64) << 32 | rng.random() as u64;

    let ap_address = Ipv4Address::from(AP_IP);
    let ap_config = NetConfig::ipv4_static(StaticConfigV4 {
        address: Ipv4Cidr::new(ap_address, AP_PREFIX_LEN),
        gateway: Some(ap_address),
        dns_servers: Default::default(),
    });

    static AP_RESOURCES: StaticCell<StackResources<SOCKETS_PER_STACK>> = StaticCell::new();
    static STA_RESOURCES: StaticCell<StackResources<SOCKETS_PER_STACK>> = StaticCell::new();

    let (ap_stack, ap_runner) = embassy_net::new(
        wifi_interfaces.ap,
        ap_config,
        AP_RESOURCES.init(StackResources::new()),
        ap_seed,
    );
    let (sta_stack, sta_runner) = embassy_net::new(
        wifi_interfaces.sta,
        NetConfig::dhcpv4(Default::default()),
        STA_RESOURCES.init(StackResources::new()),
        sta_seed,
    );

    spawner.spawn(indicator_task(device)).unwrap();

    spawner.spawn(net_task(ap_runner)).unwrap();
    spawner.spawn(net_task(sta_runner)).unwrap();
    spawner.spawn(dhcp_server_task(ap_stack)).unwrap();
    spawner.spawn(station_ip_task(sta_stack)).unwrap();

    // HTTP Server auf beiden Interfaces
    for (index, stack) in [ap_stack, sta_stack].into_iter().enumerate() {
        for slot in 0..HTTP_TASKS_PER_STACK {
            let task_id = index * HTTP_TASKS_PER_STACK + slot;
            spawner
                .spawn(http_server_task(task_id, stack, device))
                .unwrap();
        }
    }

    // mDNS nur im Heimnetz
    spawner.spawn(mdns_responder_task(sta_stack)).unwrap();

    // Main-Loop: schläft (alle Arbeit läuft in Tasks)
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
