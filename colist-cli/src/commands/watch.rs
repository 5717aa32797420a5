//! `colist watch <list-id>`: follow a list as peers change it.

use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use colist_core::{List, ListId};

use crate::commands::lists::print_list;
use crate::peer::{ConnectArgs, Session};

const POLL: Duration = Duration::from_millis(250);

#[derive(Args, Debug)]
pub struct WatchArgs {
    pub list_id: String,

    /// Print each version as one compact JSON line.
    #[arg(long)]
    pub json: bool,

    /// Stop after this many seconds instead of running until interrupted.
    #[arg(long = "for", value_name = "SECS")]
    pub duration: Option<u64>,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

impl WatchArgs {
    pub fn run(self) -> Result<()> {
        let session = Session::start(&self.connect)?;
        if !session.is_online() {
            bail!("watch needs a running relay");
        }
        let list = session.open(&ListId::from(self.list_id.as_str()))?;
        let json = self.json;
        render(&list, json)?;

        let store = Rc::clone(session.peer().list_store());
        session.peer().list_store().subscribe(move || {
            let Some(list) = store.state() else { return };
            if let Err(err) = render(&list, json) {
                eprintln!("{} {err:#}", "error:".red().bold());
            }
        });
        session.peer().session_store().subscribe({
            let store = Rc::clone(session.peer().session_store());
            move || {
                if !json {
                    if let Some(item) = store.state().peer_editing {
                        println!("{} a peer is editing {item}", "…".bright_black());
                    }
                }
            }
        });

        let deadline = self
            .duration
            .map(|secs| Instant::now() + Duration::from_secs(secs));
        loop {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Ok(());
            }
            session.pump(POLL)?;
        }
    }
}

fn render(list: &List, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(list)?);
    } else {
        print_list(list);
    }
    Ok(())
}
