mod config;
mod error;
mod logging;
mod models;
mod mqtt;
mod observer;
mod pipeline;
mod rest;

use tracing::{error, info};

#[tokio::main]
pub async fn main() -> std::io::Result<()> {
    logging::init();
    let config = config::Config::load();

    let db_conn = match models::establish_db_connection(&config).await {
        Some(conn) => conn,
        None => {
            error!("Failed connecting to database");
            std::process::exit(1);
        }
    };
    if let Err(e) = sqlx::migrate!("./migrations").run(&db_conn).await {
        error!("Failed migrating database schema: {}", e);
        std::process::exit(1);
    }

    let observer = observer::TelemetryObserver::new(&config, db_conn);
    observer.init().await;
    observer::register_sigint_handler(observer.shutdown_handle());

    let receive_loop = observer::TelemetryObserver::dispatch_receive_loop(observer.clone());
    let server_daemon = rest::dispatch_server(observer.clone(), config.server_port);

    tokio::select! {
        clean = receive_loop => {
            if clean {
                info!("Telemetry loop ended after shutdown request");
            } else {
                error!("Telemetry loop ended unexpectedly");
                std::process::exit(1);
            }
        }
        _ = server_daemon => {
            error!("Webserver ended unexpectedly");
            std::process::exit(1);
        }
    }
    Ok(())
}
