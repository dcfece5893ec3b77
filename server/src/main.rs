// CEMUhook/DSU motion bridge server.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use padmotion_server::app::{AppState, Hub};
use padmotion_server::constants::{DSU_UDP_PORT, HTTP_PORT};
use padmotion_server::http;
use padmotion_server::net::local_ipv4_addrs;
use padmotion_server::tasks;
use padmotion_server::udp;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let http_bind = env::var("HTTP_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let http_port = env::var("HTTP_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(HTTP_PORT);
    let http_addr: SocketAddr = format!("{}:{}", http_bind, http_port)
        .parse()
        .expect("invalid HTTP_BIND or HTTP_PORT");

    let udp_bind = env::var("DSU_UDP_BIND")
        .ok()
        .and_then(|value| value.parse::<IpAddr>().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    let udp_port = env::var("DSU_UDP_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DSU_UDP_PORT);

    let socket = tokio::net::UdpSocket::bind(SocketAddr::new(udp_bind, udp_port))
        .await
        .expect("failed to bind DSU UDP socket");

    let server_id: u32 = rand::random();
    info!(server_id, "server identity chosen");

    let state = AppState {
        hub: Arc::new(RwLock::new(Hub::new())),
        socket: Arc::new(socket),
        server_id,
    };

    let dispatch_state = state.clone();
    tokio::spawn(async move {
        if let Err(err) = udp::dsu_loop(dispatch_state).await {
            warn!(?err, "dsu dispatch exited");
        }
    });

    let sweep_state = state.clone();
    tokio::spawn(async move {
        tasks::sweep_task(sweep_state).await;
    });

    for ip in local_ipv4_addrs() {
        info!("phone sensor page: http://{}:{}", ip, http_port);
    }
    info!(
        port = udp_port,
        "point the emulator DSU/CEMUhook backend at this host"
    );

    let app = http::router(state);
    info!(%http_addr, "starting server");
    axum::Server::bind(&http_addr)
        .serve(app.into_make_service())
        .await
        .expect("server failed");
}
