// HTTP Server Task - Serviert die Web-Oberfläche und die Control-API
use alloc::vec::Vec;

use defmt::info;
use embassy_net::Stack;
use embassy_time::Duration;
use esp_core::ApiResponse;
use esp_core::api;
use picoserve::response::{Connection, IntoResponse, Response, ResponseWriter, StatusCode};
use picoserve::routing::get;
use picoserve::{ResponseSent, io::embedded_io_async};

use crate::config::{HTTP_BUFFER_SIZE, HTTP_PORT, TCP_RX_BUFFER_SIZE, TCP_TX_BUFFER_SIZE};
use crate::web::{APP_JS, INDEX_HTML};
use crate::{DeviceCell, with_device};

/// Antwort eines API-Handlers aus `esp_core::api`
///
/// Status, Content-Type und Body kommen unverändert aus dem Handler.
struct ApiReply(ApiResponse);

impl IntoResponse for ApiReply {
    async fn write_to<R: embedded_io_async::Read, W: ResponseWriter<Error = R::Error>>(
        self,
        connection: Connection<'_, R>,
        response_writer: W,
    ) -> Result<ResponseSent, W::Error> {
        let ApiResponse {
            status,
            content_type,
            body,
        } = self.0;

        Response::new(StatusCode::new(status), body.as_str())
            .with_header("Content-Type", content_type)
            .write_to(connection, response_writer)
            .await
    }
}

/// HTTP Server Task
///
/// Wird pro Netzwerk-Interface (Access Point, Station) mehrfach gespawnt,
/// damit Seite, Skript und API-Aufrufe parallel bedient werden.
///
/// Routen:
/// - `GET /` und `GET /app.js` - Web-Oberfläche
/// - `GET|POST /api/led` - Farbe der Status-LED
/// - `GET|POST /api/wifi` - Zugangsdaten und Netzwerk-Scan
///
/// Unbekannte Pfade beantwortet picoserve mit 404, falsche Methoden mit 405.
///
/// # Parameter
/// - `task_id`: Eindeutige ID über alle Interfaces
/// - `stack`: embassy-net Stack des Interfaces
/// - `device`: Geteilter Geräte-Kontext
#[embassy_executor::task(pool_size = 4)]
pub async fn http_server_task(task_id: usize, stack: Stack<'static>, device: &'static DeviceCell) {
    info!("HTTP: Server task {} starting on port {}...", task_id, HTTP_PORT);

    let app = picoserve::Router::new()
        .route("/", get(serve_html))
        .route("/app.js", get(serve_script))
        .route(
            "/api/led",
            get(move || async move { ApiReply(with_device(device, |device| api::get_led(device))) })
                .post(move |body: Vec<u8>| async move {
                    ApiReply(with_device(device, |device| api::post_led(device, &body)))
                }),
        )
        .route(
            "/api/wifi",
            // Der Scan blockiert den Executor für die Dauer eines Suchlaufs
            get(move || async move { ApiReply(with_device(device, |device| api::get_wifi(device))) })
                .post(move |body: Vec<u8>| async move {
                    ApiReply(with_device(device, |device| api::post_wifi(device, &body)))
                }),
        );

    let config = picoserve::Config::new(picoserve::Timeouts {
        start_read_request: Some(Duration::from_secs(5)),
        read_request: Some(Duration::from_secs(1)),
        write: Some(Duration::from_secs(1)),
        persistent_start_read_request: Some(Duration::from_secs(5)),
    })
    .keep_connection_alive();

    let mut http_buffer = [0u8; HTTP_BUFFER_SIZE];
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];

    let server = picoserve::Server::new(&app, &config, &mut http_buffer);

    let _ = server
        .listen_and_serve(task_id, stack, HTTP_PORT, &mut rx_buffer, &mut tx_buffer)
        .await;

    info!("HTTP: Server task {} ended", task_id);
}

/// Serviert die HTML-Hauptseite
async fn serve_html() -> impl IntoResponse {
    Response::new(StatusCode::OK, INDEX_HTML).with_header("Content-Type", "text/html; charset=utf-8")
}

/// Serviert das Skript der Web-Oberfläche
async fn serve_script() -> impl IntoResponse {
    Response::new(StatusCode::OK, APP_JS)
        .with_header("Content-Type", "application/javascript; charset=utf-8")
}
