//! The peer a single CLI invocation runs: local replica under
//! `<data dir>/peer`, plus a relay connection unless offline.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use colist_client::{Action, ClientError, NullLink, Peer, PeerLink};
use colist_core::config::{self, peer_dir};
use colist_core::{ClientEvent, List, ListId, ListRef, ServerEvent, Settings};
use colist_relay::{PeerConnection, RelayError};
use colist_store::{FileDocumentStore, ReplicaStore};

/// Connection flags shared by every list command.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectArgs {
    /// Relay host; overrides config and COLIST_HOST.
    #[arg(long)]
    pub host: Option<String>,

    /// Relay port; overrides config and COLIST_PORT.
    #[arg(long)]
    pub port: Option<u16>,

    /// Only touch the local replica.
    #[arg(long)]
    pub offline: bool,
}

impl ConnectArgs {
    /// Home directory and effective settings, with logging installed.
    pub fn settings(&self) -> Result<(PathBuf, Settings)> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let mut settings =
            config::load_at(&home).context("failed to load ~/.colist/config.yaml")?;
        if let Some(host) = &self.host {
            settings.server.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        colist_relay::init_tracing(&settings.log);
        Ok((home, settings))
    }
}

struct SocketLink(Rc<RefCell<PeerConnection>>);

impl PeerLink for SocketLink {
    fn emit(&self, event: ClientEvent) -> Result<(), ClientError> {
        self.0
            .borrow()
            .send(&event)
            .map_err(|err| ClientError::Link(err.to_string()))
    }
}

pub struct Session {
    peer: Peer<FileDocumentStore>,
    conn: Option<Rc<RefCell<PeerConnection>>>,
    timeout: Duration,
}

impl Session {
    pub fn start(args: &ConnectArgs) -> Result<Self> {
        let (home, settings) = args.settings()?;
        let local = peer_dir(&settings.data_dir(&home));
        let replica = Arc::new(ReplicaStore::new(FileDocumentStore::new(local)));
        let timeout = settings.client.timeout();

        let conn = if args.offline {
            None
        } else {
            match PeerConnection::connect(&settings.server.addr(), timeout) {
                Ok(conn) => Some(Rc::new(RefCell::new(conn))),
                Err(RelayError::RelayNotRunning { addr }) => {
                    eprintln!(
                        "{} relay not reachable at {addr}; working offline",
                        "warning:".yellow().bold()
                    );
                    None
                }
                Err(err) => return Err(err).context("failed to connect to relay"),
            }
        };

        let link: Rc<dyn PeerLink> = match &conn {
            Some(conn) => Rc::new(SocketLink(conn.clone())),
            None => Rc::new(NullLink),
        };
        Ok(Self {
            peer: Peer::new(replica, link),
            conn,
            timeout,
        })
    }

    pub fn peer(&self) -> &Peer<FileDocumentStore> {
        &self.peer
    }

    pub fn is_online(&self) -> bool {
        self.conn.is_some()
    }

    pub fn create(&self, name: &str) -> Result<List> {
        self.peer.dispatch(Action::AppInitialize {
            list_id: None,
            list_name: Some(name.to_string()),
        });
        let list = self
            .peer
            .list()
            .context("list was not created (see log output)")?;
        self.settle(&list.id)?;
        Ok(list)
    }

    /// Open `id` from the local replica, or from the relay when it is not
    /// stored locally, then catch up with the relay's copy.
    pub fn open(&self, id: &ListId) -> Result<List> {
        self.peer.dispatch(Action::AppInitialize {
            list_id: Some(id.clone()),
            list_name: None,
        });
        if self.peer.list().is_some() {
            self.settle(id)?;
        } else {
            // The list store already asked the relay.
            self.await_load(id)?;
        }
        match self.peer.list() {
            Some(list) => Ok(list),
            None => bail!("list '{id}' was not found locally or on the relay"),
        }
    }

    /// Dispatch a list mutation and wait until the relay has committed it.
    pub fn mutate(&self, action: Action) -> Result<List> {
        let before = self.peer.list();
        let kind = action.kind();
        self.peer.dispatch(action);
        let after = self.peer.list();
        let Some(list) = after.filter(|after| Some(after) != before.as_ref()) else {
            bail!("{kind} was not applied (see log output)");
        };
        self.settle(&list.id)?;
        Ok(list)
    }

    pub fn dispatch(&self, action: Action) {
        self.peer.dispatch(action);
    }

    /// Receive at most one relay event. Returns whether one arrived.
    pub fn pump(&self, timeout: Duration) -> Result<bool> {
        let Some(conn) = &self.conn else {
            std::thread::sleep(timeout);
            return Ok(false);
        };
        let event = conn
            .borrow_mut()
            .recv_timeout(timeout)
            .context("relay connection failed")?;
        match event {
            Some(event) => {
                self.peer.receive(event);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// The relay handles one connection's events in order, so the answer to
    /// a fresh `initial-load` means everything sent before it is committed.
    fn settle(&self, id: &ListId) -> Result<()> {
        let Some(conn) = &self.conn else {
            return Ok(());
        };
        conn.borrow()
            .send(&ClientEvent::InitialLoad(ListRef {
                list_id: id.clone(),
            }))
            .context("failed to reach relay")?;
        self.await_load(id)
    }

    fn await_load(&self, id: &ListId) -> Result<()> {
        let Some(conn) = &self.conn else {
            return Ok(());
        };
        let deadline = Instant::now() + self.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                eprintln!(
                    "{} relay did not answer for '{id}' within {:?}",
                    "warning:".yellow().bold(),
                    self.timeout
                );
                return Ok(());
            }
            let event = conn
                .borrow_mut()
                .recv_timeout(remaining)
                .context("relay connection failed")?;
            let Some(event) = event else { continue };
            let answered = match &event {
                ServerEvent::ListLoaded(list) => list.id == *id,
                ServerEvent::ListNotFound(not_found) => not_found.list_id == *id,
                _ => false,
            };
            self.peer.receive(event);
            if answered {
                return Ok(());
            }
        }
    }
}
