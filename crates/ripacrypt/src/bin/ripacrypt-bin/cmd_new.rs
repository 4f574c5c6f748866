use super::*;
use std::io::{IsTerminal, Read};
use std::path::Path;

pub(crate) fn exec(acct: &AccountFile, opt: OptNew) -> RcResult<()> {
    acct.account.require_registered()?;

    let stdin = std::io::stdin();
    let payload =
        read_payload(opt.data.as_deref(), stdin.is_terminal(), stdin.lock())?;

    let new_crypt = RcNewCrypt {
        payload,
        already_encrypted: opt.isencrypted,
        description: opt.description,
        checkin_duration: opt.checkinduration,
        miss_count: opt.misscount,
    };

    let client = acct.client(&opt.net)?;
    let res = client.create_crypt(&acct.account, new_crypt)?;

    println!("crypt id: {}", res.crypt.crypt_id);
    print_debug(&opt.net, &res)?;

    Ok(())
}

/// Crypt content from `data`, or from `stdin` when no file is given.
/// A terminal on stdin is refused rather than waited on.
fn read_payload(
    data: Option<&Path>,
    stdin_is_terminal: bool,
    mut stdin: impl Read,
) -> RcResult<Vec<u8>> {
    match data {
        Some(path) => std::fs::read(path).map_err(|e| {
            RcError::InvalidInput(format!("could not read {path:?}: {e}"))
        }),
        None if stdin_is_terminal => Err(RcError::InvalidInput(
            "supply the crypt content with --data or pipe it on stdin".into(),
        )),
        None => {
            tracing::info!("reading crypt content from stdin");
            let mut buf = Vec::new();
            stdin.read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_stdin_is_refused() {
        let err = read_payload(None, true, &b"ignored"[..]).unwrap_err();
        assert!(matches!(err, RcError::InvalidInput(_)), "{err:?}");
    }

    #[test]
    fn piped_stdin_is_read() {
        let payload = read_payload(None, false, &b"piped"[..]).unwrap();
        assert_eq!(b"piped".to_vec(), payload);
    }

    #[test]
    fn data_file_wins_over_stdin() {
        let tmp = tempdir::TempDir::new("ripacrypt-new").unwrap();
        let path = tmp.path().join("data.txt");
        std::fs::write(&path, b"from file").unwrap();
        let payload = read_payload(Some(path.as_path()), true, &b"piped"[..]).unwrap();
        assert_eq!(b"from file".to_vec(), payload);
    }
}
