use assert_cmd::Command;
use std::path::Path;

/// Write a raw account record into a ripacrypt root.
pub fn write_account(root: &Path, content: &str) {
    std::fs::write(root.join(ripacrypt::CONFIG_N), content).unwrap();
}

/// Write a raw legacy `rc.conf` record into a ripacrypt root.
pub fn write_legacy_account(root: &Path, content: &str) {
    std::fs::write(root.join(ripacrypt::LEGACY_CONFIG_N), content).unwrap();
}

/// Point the account record at a directory that does not exist, so
/// loading finds nothing and saving fails.
#[cfg(unix)]
pub fn make_account_unwritable(root: &Path) {
    std::os::unix::fs::symlink(
        root.join("missing-dir").join("record.yaml"),
        root.join(ripacrypt::CONFIG_N),
    )
    .unwrap();
}

/// Runtime for the http mock server, which serves from its own thread.
pub fn mock_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// A registered account record with no usable key material.
pub fn write_registered(root: &Path) {
    write_account(
        root,
        "userid: 42\nbtcaddr: 1ExistingAddress\nfingerprint: 0123456789ABCDEF\n",
    );
}

/// `ripacrypt` rooted at `root`, logging everything to stderr.
pub fn ripacrypt(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ripacrypt").unwrap();
    cmd.env("RUST_LOG", "trace");
    cmd.arg(format!("--ripacrypt-root={}", root.display()));
    cmd
}
