use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn colist_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_colist"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("COLIST_HOST")
        .env_remove("COLIST_PORT")
        .env_remove("COLIST_DATA_DIR")
        .env("RUST_LOG", "warn");
    cmd
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("bind")
        .local_addr()
        .expect("addr")
        .port()
}

struct RelayProcess {
    child: Child,
}

impl RelayProcess {
    fn start(home: &Path, port: u16) -> Self {
        let child = colist_cmd(home)
            .args(["serve", "--port", &port.to_string()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn relay");

        let deadline = Instant::now() + Duration::from_secs(10);
        while TcpStream::connect(("127.0.0.1", port)).is_err() {
            assert!(Instant::now() < deadline, "relay did not start listening");
            sleep(Duration::from_millis(50));
        }
        Self { child }
    }
}

impl Drop for RelayProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn create_list(home: &Path, name: &str, extra: &[&str]) -> String {
    let output = colist_cmd(home)
        .args(["create", name, "--json"])
        .args(extra)
        .output()
        .expect("run create");
    assert!(output.status.success(), "create failed: {output:?}");
    let list: serde_json::Value = serde_json::from_slice(&output.stdout).expect("list JSON");
    list["id"].as_str().expect("id").to_string()
}

#[test]
fn two_peers_share_a_list_through_the_relay() {
    let relay_home = TempDir::new().expect("relay home");
    let alice = TempDir::new().expect("alice home");
    let bob = TempDir::new().expect("bob home");
    let port = free_port();
    let _relay = RelayProcess::start(relay_home.path(), port);
    let port_arg = port.to_string();
    let connect = ["--port", port_arg.as_str()];

    let id = create_list(alice.path(), "Groceries", &connect);
    assert!(id.ends_with("-groceries"));

    colist_cmd(alice.path())
        .args(["add", &id, "milk"])
        .args(connect)
        .assert()
        .success()
        .stdout(contains("Added"));

    // Bob has never seen the list; it comes from the relay.
    let output = colist_cmd(bob.path())
        .args(["show", &id, "--json"])
        .args(connect)
        .output()
        .expect("run show");
    assert!(output.status.success(), "show failed: {output:?}");
    let list: serde_json::Value = serde_json::from_slice(&output.stdout).expect("list JSON");
    let items = list["items"].as_object().expect("items");
    assert_eq!(items.len(), 1);
    let (item_id, item) = items.iter().next().expect("item");
    assert_eq!(item["text"], "milk");

    colist_cmd(bob.path())
        .args(["toggle", &id, item_id])
        .args(connect)
        .assert()
        .success()
        .stdout(contains("done"));

    // Alice catches up from the relay even though her replica has the list.
    colist_cmd(alice.path())
        .args(["show", &id, "--json"])
        .args(connect)
        .assert()
        .success()
        .stdout(contains("\"complete\": true"));

    // The relay wrote its copy under its own data dir.
    let lists = relay_home.path().join(".colist").join("lists");
    assert_eq!(std::fs::read_dir(lists).expect("lists dir").count(), 1);
}

#[test]
fn unknown_list_is_reported() {
    let relay_home = TempDir::new().expect("relay home");
    let home = TempDir::new().expect("home");
    let port = free_port();
    let _relay = RelayProcess::start(relay_home.path(), port);

    colist_cmd(home.path())
        .args(["show", "1-nothing-here", "--port", &port.to_string()])
        .assert()
        .failure()
        .stderr(contains("not found"));
}

#[test]
fn offline_peer_works_from_its_own_replica() {
    let home = TempDir::new().expect("home");
    let id = create_list(home.path(), "Solo list", &["--offline"]);

    colist_cmd(home.path())
        .args(["add", &id, "write tests", "--offline"])
        .assert()
        .success();

    colist_cmd(home.path())
        .args(["show", &id, "--offline"])
        .assert()
        .success()
        .stdout(contains("write tests"))
        .stdout(contains("Solo list"));

    colist_cmd(home.path())
        .args(["toggle", &id, "no-such-item", "--offline"])
        .assert()
        .failure()
        .stderr(contains("no item 'no-such-item'"));
}

#[test]
fn unreachable_relay_falls_back_to_offline() {
    let home = TempDir::new().expect("home");
    let port = free_port();

    colist_cmd(home.path())
        .args(["create", "Fallback", "--port", &port.to_string()])
        .assert()
        .success()
        .stderr(contains("working offline"));
}

#[test]
fn config_init_writes_defaults_once() {
    let home = TempDir::new().expect("home");

    colist_cmd(home.path())
        .args(["config", "init"])
        .assert()
        .success();
    let written = std::fs::read_to_string(home.path().join(".colist").join("config.yaml"))
        .expect("config file");
    assert!(written.contains("port: 3001"));

    colist_cmd(home.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(contains("--force"));

    colist_cmd(home.path())
        .args(["config", "show"])
        .env("COLIST_PORT", "4555")
        .assert()
        .success()
        .stdout(contains("port: 4555"));
}
