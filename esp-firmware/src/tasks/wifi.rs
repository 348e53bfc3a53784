// WiFi Tasks - Netzwerk-Stacks, DHCP-Server (Access Point), IP-Monitor (Station)
use core::net::Ipv4Addr;

use defmt::{Debug2Format, info, warn};
use edge_dhcp::server::{Server as DhcpServer, ServerOptions as DhcpServerOptions};
use edge_dhcp::{Options as DhcpOptions, Packet as DhcpPacket};
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{Ipv4Address, Runner, Stack};
use embassy_time::{Duration, Timer};
use esp_radio::wifi::WifiDevice;

use crate::config::{
    AP_IP, DHCP_BUFFER_SIZE, DHCP_CLIENT_PORT, DHCP_RANGE_END, DHCP_RANGE_START,
    DHCP_SERVER_PORT,
};

/// Maximale Anzahl gleichzeitiger DHCP-Leases
const DHCP_MAX_LEASES: usize = 8;

/// Network Task
///
/// Prozessiert die Pakete eines Interfaces. Wird je einmal für
/// Access Point und Station gespawnt.
#[embassy_executor::task(pool_size = 2)]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// DHCP-Server Task (nur Access-Point Interface)
///
/// Vergibt Adressen an Clients, die sich mit dem Provisionierungs-AP
/// verbinden. Ohne den Server müssten Clients eine statische IP setzen.
#[embassy_executor::task]
pub async fn dhcp_server_task(stack: Stack<'static>) {
    while !stack.is_config_up() {
        Timer::after(Duration::from_millis(100)).await;
    }

    let mut rx_meta = [PacketMetadata::EMPTY; 2];
    let mut rx_buffer = [0u8; DHCP_BUFFER_SIZE];
    let mut tx_meta = [PacketMetadata::EMPTY; 2];
    let mut tx_buffer = [0u8; DHCP_BUFFER_SIZE];

    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    if let Err(e) = socket.bind(DHCP_SERVER_PORT) {
        warn!("DHCP: Failed to bind port {}: {}", DHCP_SERVER_PORT, Debug2Format(&e));
        return;
    }

    let server_ip = Ipv4Addr::from(AP_IP);
    let mut gw_buf = [Ipv4Addr::UNSPECIFIED; 1];
    let server_options = DhcpServerOptions::new(server_ip, Some(&mut gw_buf));

    let mut server = DhcpServer::<_, DHCP_MAX_LEASES>::new_with_et(server_ip);
    server.range_start = Ipv4Addr::from(DHCP_RANGE_START);
    server.range_end = Ipv4Addr::from(DHCP_RANGE_END);

    info!("DHCP: Server running on {}", Debug2Format(&server_ip));

    let mut buf = [0u8; DHCP_BUFFER_SIZE];
    loop {
        let Ok((len, _meta)) = socket.recv_from(&mut buf).await else {
            continue;
        };

        let request = match DhcpPacket::decode(&buf[..len]) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("DHCP: Decode error: {}", Debug2Format(&e));
                continue;
            }
        };

        let mut opt_buf = DhcpOptions::buf();
        let Some(reply) = server.handle_request(&mut opt_buf, &server_options, &request) else {
            continue;
        };

        match reply.encode(&mut buf) {
            Ok(encoded) => {
                // Clients haben noch keine Adresse: Antwort per Broadcast
                let dest = (Ipv4Address::new(255, 255, 255, 255), DHCP_CLIENT_PORT);
                if let Err(e) = socket.send_to(encoded, dest).await {
                    warn!("DHCP: Send error: {}", Debug2Format(&e));
                }
            }
            Err(e) => warn!("DHCP: Encode error: {}", Debug2Format(&e)),
        }
    }
}

/// Station IP Monitor Task
///
/// Wartet bis die Station eine IP-Adresse per DHCP erhalten hat
/// und loggt die Netzwerk-Konfiguration
#[embassy_executor::task]
pub async fn station_ip_task(stack: Stack<'static>) {
    stack.wait_link_up().await;
    info!("WiFi: Station link is up, waiting for IP address...");

    stack.wait_config_up().await;
    if let Some(config) = stack.config_v4() {
        info!("WiFi: Got IP address!");
        info!("  IP:      {}", Debug2Format(&config.address.address()));
        info!("  Gateway: {}", Debug2Format(&config.gateway));
        info!("  DNS:     {}", Debug2Format(&config.dns_servers));
    }
}
