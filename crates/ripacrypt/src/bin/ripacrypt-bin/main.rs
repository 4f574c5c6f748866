#![deny(missing_docs)]
#![deny(unsafe_code)]

//! RIPACrypt dead man's switch command line client

use ripacrypt::dependencies::*;
use ripacrypt_api::prelude::*;
use std::path::PathBuf;
use structopt::StructOpt;

mod cmd_checkin;
mod cmd_get;
mod cmd_getchallenge;
mod cmd_new;
mod cmd_newbtc;
mod cmd_register;

#[derive(Debug, StructOpt)]
pub(crate) struct OptNet {
    /// Route requests through the local Tor SOCKS5 proxy,
    /// regardless of the account's Tor preference.
    #[structopt(long, verbatim_doc_comment)]
    pub usetor: bool,

    /// Dump the raw api response as json to stdout.
    #[structopt(long, verbatim_doc_comment)]
    pub debug: bool,
}

#[derive(Debug, StructOpt)]
pub(crate) struct OptRegister {
    /// Register an existing armored public key instead of
    /// generating a new key pair. Without the matching private
    /// key in the account record, challenges cannot be
    /// answered and crypts cannot be created or checked in.
    #[structopt(long, verbatim_doc_comment)]
    pub publickey: Option<PathBuf>,

    /// Name on a generated key. We recommend leaving this alone.
    #[structopt(long, default_value = "Anonymous", verbatim_doc_comment)]
    pub name: String,

    /// Comment on a generated key.
    #[structopt(long, verbatim_doc_comment)]
    pub comment: Option<String>,

    /// Email on a generated key. Defaults to a random
    /// address at clients.ripacrypt.download.
    #[structopt(long, verbatim_doc_comment)]
    pub email: Option<String>,

    #[structopt(flatten)]
    pub net: OptNet,
}

#[derive(Debug, StructOpt)]
pub(crate) struct OptNew {
    /// File holding the crypt content. Read from stdin if omitted.
    #[structopt(long, verbatim_doc_comment)]
    pub data: Option<PathBuf>,

    /// The content is already a base64 encoded pgp message,
    /// store it as is.
    #[structopt(long, verbatim_doc_comment)]
    pub isencrypted: bool,

    /// Free text description of the crypt.
    #[structopt(long, default_value = "", verbatim_doc_comment)]
    pub description: String,

    /// Seconds allowed between check-ins.
    #[structopt(long, default_value = "86400", verbatim_doc_comment)]
    pub checkinduration: i64,

    /// Missed check-ins tolerated before the crypt is destroyed.
    #[structopt(long, default_value = "3", verbatim_doc_comment)]
    pub misscount: i64,

    #[structopt(flatten)]
    pub net: OptNet,
}

#[derive(Debug, StructOpt)]
pub(crate) struct OptCheckin {
    /// The crypt to keep alive.
    #[structopt(long, default_value = "", verbatim_doc_comment)]
    pub crypt: String,

    #[structopt(flatten)]
    pub net: OptNet,
}

#[derive(Debug, StructOpt)]
pub(crate) struct OptGet {
    /// The crypt to fetch.
    #[structopt(long, default_value = "", verbatim_doc_comment)]
    pub crypt: String,

    /// Decrypt the content with the account's private key
    /// and print the plaintext.
    #[structopt(long, verbatim_doc_comment)]
    pub decrypt: bool,

    #[structopt(flatten)]
    pub net: OptNet,
}

#[derive(Debug, StructOpt)]
pub(crate) struct OptGetChallenge {
    /// Also decrypt the challenge and print the plaintext.
    #[structopt(long, verbatim_doc_comment)]
    pub decrypt: bool,

    #[structopt(flatten)]
    pub net: OptNet,
}

#[derive(Debug, StructOpt)]
pub(crate) struct OptNewBtc {
    /// Required. The service does not keep old addresses,
    /// anything sent to the current address after this
    /// is lost. Make sure your balance has been credited.
    #[structopt(long, verbatim_doc_comment)]
    pub i_understand_the_old_address_is_lost: bool,

    #[structopt(flatten)]
    pub net: OptNet,
}

#[derive(Debug, StructOpt)]
enum Cmd {
    /// Register a new account, generating a key pair
    /// unless --publickey is given.
    #[structopt(verbatim_doc_comment)]
    Register(OptRegister),

    /// Create a new crypt.
    #[structopt(verbatim_doc_comment)]
    New(OptNew),

    /// Keep a crypt alive.
    #[structopt(verbatim_doc_comment)]
    Checkin(OptCheckin),

    /// Fetch a crypt.
    #[structopt(verbatim_doc_comment)]
    Get(OptGet),

    /// Request an encrypted challenge.
    #[structopt(verbatim_doc_comment)]
    Getchallenge(OptGetChallenge),

    /// Replace the account's bitcoin address.
    /// The old address is gone for good.
    #[structopt(verbatim_doc_comment)]
    Newbtc(OptNewBtc),
}

#[derive(Debug, StructOpt)]
#[structopt(about = "RIPACrypt dead man's switch client")]
struct Opt {
    /// RIPACrypt root directory, holds the account record.
    /// Defaults to ~/.ripacrypt
    #[structopt(short = "r", long, env = "RIPACRYPT_ROOT", verbatim_doc_comment)]
    ripacrypt_root: Option<PathBuf>,

    /// The subcommand to execute
    #[structopt(subcommand)]
    cmd: Cmd,
}

/// The loaded account and where it lives.
pub(crate) struct AccountFile {
    pub path: PathBuf,
    pub account: RcAccount,
}

impl AccountFile {
    fn load(root: PathBuf) -> RcResult<Self> {
        let root = ripacrypt::prepare_root(&root)?;
        let path = ripacrypt::account_path(&root);
        let account = RcAccount::load_with_legacy(
            &path,
            &ripacrypt::legacy_account_path(&root),
        )?;
        Ok(Self { path, account })
    }

    /// Save the record. The service side change has already happened by
    /// the time this runs, so on failure the record goes to stdout where
    /// it can be recovered by hand.
    pub fn save_or_print(&self) -> RcResult<()> {
        if let Err(e) = self.account.save(&self.path) {
            println!("{}", self.account);
            return Err(RcError::Config(format!(
                "{e}; the account record above was NOT saved, copy it to {:?}",
                self.path
            )));
        }
        Ok(())
    }

    pub fn client(&self, net: &OptNet) -> RcResult<RcClient> {
        let route = self.account.route(net.usetor);
        match route {
            RcRoute::Tor => tracing::info!("using tor"),
            RcRoute::Direct => tracing::info!("connecting directly"),
        }
        RcClient::connect(self.account.endpoint_config(), route)
    }
}

pub(crate) fn print_debug<T: serde::Serialize>(net: &OptNet, res: &T) -> RcResult<()> {
    if net.debug {
        let json = serde_json::to_string_pretty(res).map_err(RcError::other)?;
        println!("{json}");
    }
    Ok(())
}

fn exec() -> RcResult<()> {
    let Opt {
        ripacrypt_root,
        cmd,
    } = Opt::from_args();
    let root = ripacrypt_root.unwrap_or_else(ripacrypt::default_root);
    let mut acct = AccountFile::load(root)?;
    match cmd {
        Cmd::Register(opt) => cmd_register::exec(&mut acct, opt),
        Cmd::New(opt) => cmd_new::exec(&acct, opt),
        Cmd::Checkin(opt) => cmd_checkin::exec(&acct, opt),
        Cmd::Get(opt) => cmd_get::exec(&acct, opt),
        Cmd::Getchallenge(opt) => cmd_getchallenge::exec(&acct, opt),
        Cmd::Newbtc(opt) => cmd_newbtc::exec(&mut acct, opt),
    }
}

fn main() {
    ripacrypt::init_tracing();
    if let Err(e) = exec() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
