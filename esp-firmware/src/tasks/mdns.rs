// mDNS Responder Task - Hostname im Heimnetz via Multicast DNS
//
// Läuft nur auf dem Station-Interface. Im Provisionierungs-Modus bekommt
// die Station keine Adresse und der Task wartet.
//
// - Protokoll: mDNS (RFC 6762), UDP Multicast auf 224.0.0.251:5353
// - Nur A-Records (Hostname → IPv4)

use core::net::{Ipv4Addr, SocketAddr};
use core::sync::atomic::{AtomicU32, Ordering};

use defmt::{Debug2Format, error, info, warn};
use edge_mdns::{HostAnswersMdnsHandler, buf::VecBufAccess, domain::base::Ttl, host::Host, io};
use edge_nal::{MulticastV4, UdpBind, UdpSplit};
use edge_nal_embassy::{Udp, UdpBuffers};
use embassy_net::Stack;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;

use crate::config::{
    MDNS_HOSTNAME, MDNS_MULTICAST_ADDR, MDNS_PACKET_BUFFER_SIZE, MDNS_PORT,
    MDNS_RECONNECT_DELAY_SECS, MDNS_TTL_SECS, MDNS_UDP_BUFFER_SIZE,
};

static RNG_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Pseudo-Zufall für Query IDs, Eindeutigkeit reicht
fn mdns_rng(buf: &mut [u8]) {
    let mut counter = RNG_COUNTER.fetch_add(1, Ordering::Relaxed);
    for chunk in buf.chunks_mut(4) {
        let bytes = counter.to_le_bytes();
        chunk.copy_from_slice(&bytes[..chunk.len()]);
        counter = counter.wrapping_add(1);
    }
}

/// mDNS Responder Task
///
/// Advertised das Gerät als `<MDNS_HOSTNAME>.local`, sobald die Station
/// eine Adresse hat. Bei Fehlern wird nach `MDNS_RECONNECT_DELAY_SECS`
/// neu gestartet.
#[embassy_executor::task]
pub async fn mdns_responder_task(stack: Stack<'static>) {
    info!("mDNS: Task started, waiting for station address...");
    stack.wait_config_up().await;

    // Nur einmal initialisieren, der Loop startet den Responder mehrfach
    static UDP_BUFFERS: StaticCell<UdpBuffers<1, MDNS_UDP_BUFFER_SIZE, MDNS_UDP_BUFFER_SIZE>> =
        StaticCell::new();
    let udp_buffers: &'static UdpBuffers<1, MDNS_UDP_BUFFER_SIZE, MDNS_UDP_BUFFER_SIZE> =
        UDP_BUFFERS.init_with(UdpBuffers::new);

    loop {
        match run_mdns_responder(stack, udp_buffers).await {
            Ok(()) => warn!("mDNS: Responder stopped"),
            Err(e) => error!("mDNS: {}", e),
        }
        info!("mDNS: Restarting in {}s...", MDNS_RECONNECT_DELAY_SECS);
        Timer::after(Duration::from_secs(MDNS_RECONNECT_DELAY_SECS)).await;
    }
}

async fn run_mdns_responder(
    stack: Stack<'static>,
    udp_buffers: &'static UdpBuffers<1, MDNS_UDP_BUFFER_SIZE, MDNS_UDP_BUFFER_SIZE>,
) -> Result<(), MdnsError> {
    let our_ip = stack
        .config_v4()
        .ok_or(MdnsError::NoAddress)?
        .address
        .address();
    info!("mDNS: Using IP {}", Debug2Format(&our_ip));

    let udp_stack = Udp::new(stack, udp_buffers);

    let mut socket = udp_stack
        .bind(SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), MDNS_PORT))
        .await
        .map_err(|_| MdnsError::SocketBindFailed)?;

    socket
        .join_v4(Ipv4Addr::from(MDNS_MULTICAST_ADDR), Ipv4Addr::UNSPECIFIED)
        .await
        .map_err(|_| MdnsError::MulticastJoinFailed)?;

    let (recv, send) = socket.split();

    let host = Host {
        hostname: MDNS_HOSTNAME,
        ipv4: our_ip.into(),
        ipv6: [0u8; 16].into(),
        ttl: Ttl::from_secs(MDNS_TTL_SECS),
    };

    let recv_buf = VecBufAccess::<NoopRawMutex, MDNS_PACKET_BUFFER_SIZE>::new();
    let send_buf = VecBufAccess::<NoopRawMutex, MDNS_PACKET_BUFFER_SIZE>::new();
    // Von der API verlangt, wird nie ausgelöst
    let signal = Signal::<NoopRawMutex, ()>::new();

    let mdns = io::Mdns::new(
        Some(our_ip),
        None,
        recv,
        send,
        recv_buf,
        send_buf,
        mdns_rng,
        &signal,
    );

    info!("mDNS: Advertising '{}.local'", MDNS_HOSTNAME);

    mdns.run(HostAnswersMdnsHandler::new(&host))
        .await
        .map_err(|_| MdnsError::ResponderFailed)
}

#[derive(Debug, Clone, Copy, defmt::Format)]
enum MdnsError {
    /// Station hat (noch) keine IPv4-Adresse
    NoAddress,
    SocketBindFailed,
    MulticastJoinFailed,
    ResponderFailed,
}
