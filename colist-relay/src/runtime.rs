use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};

use colist_core::config::{lists_dir, LogFormat, LogSettings};
use colist_core::protocol::encode_frame;
use colist_core::{ClientEvent, ConnectionId, ServerEvent, Settings};
use colist_store::{DocumentStore, FileDocumentStore, ReplicaStore};

use crate::error::{io_err, RelayError};
use crate::rooms::RoomRelay;
use crate::router::Router;

/// Start the relay and block the current thread until it exits.
pub fn start_blocking(settings: Settings, home: &Path) -> Result<(), RelayError> {
    init_tracing(&settings.log);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(settings, home.to_path_buf()))
}

/// Bind the configured address and serve until ctrl-c.
pub async fn run(settings: Settings, home: PathBuf) -> Result<(), RelayError> {
    let lists = lists_dir(&settings.data_dir(&home));
    let addr = settings.server.addr();
    let listener = TcpListener::bind(addr.as_str())
        .await
        .map_err(|e| io_err(&addr, e))?;
    tracing::info!(%addr, lists = %lists.display(), "relay listening");

    let router = Router::new(
        Arc::new(RoomRelay::new()),
        Arc::new(ReplicaStore::new(FileDocumentStore::new(lists))),
    );
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let server_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let result = serve(listener, router, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down relay");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(RelayError::Protocol(format!("ctrl-c handler failed: {err}"))),
                    }
                }
            }
        })
    };

    let (server_result, signal_result) = tokio::join!(server_handle, signal_handle);
    handle_join("server", server_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

/// Accept connections on `listener` until `shutdown_rx` fires.
pub async fn serve<S: DocumentStore + 'static>(
    listener: TcpListener,
    router: Router<S>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), RelayError> {
    let next_id = AtomicU64::new(1);
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            accepted = listener.accept() => {
                let (stream, peer_addr) = match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        tracing::warn!(error = %err, "accept failed");
                        continue;
                    }
                };
                let conn = ConnectionId(next_id.fetch_add(1, Ordering::Relaxed));
                tracing::debug!(%conn, %peer_addr, "connection accepted");
                let router = router.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(conn, stream, router).await {
                        tracing::error!(%conn, error = %err, "connection error");
                    }
                });
            }
        }
    }
    Ok(())
}

async fn handle_connection<S: DocumentStore + 'static>(
    conn: ConnectionId,
    stream: TcpStream,
    router: Router<S>,
) -> Result<(), RelayError> {
    let (reader, writer) = stream.into_split();
    let (outbox, inbox) = mpsc::unbounded_channel::<ServerEvent>();
    router.rooms().register(conn, outbox).await;
    let writer_handle = tokio::spawn(writer_task(conn, writer, inbox));

    let result = read_loop(conn, reader, &router).await;

    // Dropping the registered outbox ends the writer once it has flushed.
    router.rooms().leave_all(conn).await;
    if let Err(err) = writer_handle.await {
        tracing::warn!(%conn, error = %err, "writer task join failure");
    }
    tracing::debug!(%conn, "connection closed");
    result
}

async fn read_loop<S: DocumentStore + 'static>(
    conn: ConnectionId,
    reader: OwnedReadHalf,
    router: &Router<S>,
) -> Result<(), RelayError> {
    let mut reader = BufReader::new(reader);
    let mut frame = Vec::new();
    loop {
        frame.clear();
        let read = reader
            .read_until(b'\n', &mut frame)
            .await
            .map_err(|e| io_err("relay socket read", e))?;
        if read == 0 {
            break;
        }
        if frame.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let event: ClientEvent = match serde_json::from_slice(&frame) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(%conn, error = %err, "unreadable frame skipped");
                continue;
            }
        };

        let name = event.name();
        match router.route(conn, event).await {
            Ok(routed) => tracing::trace!(%conn, event = name, ?routed, "routed"),
            Err(err) => tracing::error!(%conn, event = name, error = %err, "routing failed"),
        }
    }
    Ok(())
}

async fn writer_task(
    conn: ConnectionId,
    mut writer: OwnedWriteHalf,
    mut inbox: mpsc::UnboundedReceiver<ServerEvent>,
) {
    while let Some(event) = inbox.recv().await {
        if let Err(err) = write_frame(&mut writer, &event).await {
            tracing::debug!(%conn, error = %err, "write failed; dropping connection output");
            break;
        }
    }
}

async fn write_frame(writer: &mut OwnedWriteHalf, event: &ServerEvent) -> Result<(), RelayError> {
    let frame = encode_frame(event)?;
    writer
        .write_all(frame.as_bytes())
        .await
        .map_err(|e| io_err("relay socket write", e))?;
    writer
        .flush()
        .await
        .map_err(|e| io_err("relay socket flush", e))?;
    Ok(())
}

fn handle_join(
    task: &str,
    result: Result<Result<(), RelayError>, tokio::task::JoinError>,
) -> Result<(), RelayError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(RelayError::Protocol(format!(
            "{task} task join failure: {err}"
        ))),
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `log.level`.
pub fn init_tracing(log: &LogSettings) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = match log.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}
