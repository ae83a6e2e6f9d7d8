//! Web server for sharing files on the LAN.

pub mod assets;
pub mod devices;
pub mod error;
pub mod routes;
pub mod templates;

pub use assets::{content_type, StaticAssets};
pub use devices::DeviceTracker;
pub use error::{AppError, AppResult};
pub use routes::{build_router, content_disposition, AppState, MAX_UPLOAD_BYTES};
pub use templates::{FileView, IndexView, TemplateEngine, Templates};

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;

use crate::network::{lan_ip, server_url};
use crate::storage::{UploadDir, DEFAULT_FOLDER};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 5000;

/// Configuration for the web server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on, on all interfaces.
    pub port: u16,
    /// Directory holding shared files. Created if missing.
    pub upload_dir: PathBuf,
    /// Whether to open the browser automatically.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upload_dir: default_upload_dir(),
            open_browser: false,
        }
    }
}

/// The `uploads` folder next to the running executable.
///
/// Falls back to the working directory if the executable path is unknown.
pub fn default_upload_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_FOLDER)
}

/// Run the web server until Ctrl+C.
///
/// This function will:
/// 1. Create the upload directory
/// 2. Resolve the LAN address shown in the QR code
/// 3. Bind on all interfaces and serve
/// 4. Optionally open the browser
/// 5. Wait for Ctrl+C to gracefully shut down
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let upload_dir = UploadDir::create(&config.upload_dir).with_context(|| {
        format!(
            "Failed to create upload directory: {}",
            config.upload_dir.display()
        )
    })?;

    let ip = lan_ip();
    let lan_url = server_url(ip, config.port);
    let local_url = server_url(Ipv4Addr::LOCALHOST.into(), config.port);

    let state = Arc::new(AppState {
        upload_dir,
        server_url: lan_url.clone(),
        devices: DeviceTracker::new(ip),
        template_engine: TemplateEngine::new().context("Failed to load templates")?,
    });
    let root = state.upload_dir.root().to_path_buf();

    let app = build_router(state);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(%addr, %lan_url, upload_dir = %root.display(), "Server started");

    println!();
    println!("{}", "=".repeat(50));
    println!(" LAN file sharing is running");
    println!(" On this machine:    {}", local_url);
    println!(" On other devices:   {}", lan_url);
    println!(" (or scan the QR code on the home page)");
    println!(" Files are stored in {}", root.display());
    println!("{}", "=".repeat(50));
    println!("Press Ctrl+C to stop");

    if config.open_browser {
        if let Err(e) = webbrowser::open(&local_url) {
            eprintln!("Failed to open browser: {}", e);
        }
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    println!("\nServer stopped");
    Ok(())
}

/// Wait for the shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
