use super::*;

pub(crate) fn exec(acct: &mut AccountFile, opt: OptRegister) -> RcResult<()> {
    if acct.account.is_registered() {
        return Err(RcError::AlreadyRegistered(acct.account.user_id));
    }

    let key_source = match &opt.publickey {
        Some(path) => {
            let public_key = std::fs::read_to_string(path).map_err(|e| {
                RcError::KeyParse(format!("could not read {path:?}: {e}"))
            })?;
            RcKeySource::PublicKey(public_key)
        }
        None => {
            tracing::info!("no public key given, generating a new key pair");
            RcKeySource::Generate(
                RcKeyAlgorithm::default(),
                RcIdentity {
                    name: opt.name.clone(),
                    comment: opt.comment.clone(),
                    email: opt.email.clone(),
                },
            )
        }
    };

    if opt.net.usetor {
        acct.account.use_tor = true;
    }

    let client = acct.client(&opt.net)?;
    let res = client.register(&mut acct.account, key_source)?;

    println!("fingerprint: {}", acct.account.fingerprint);
    println!("user id: {}", acct.account.user_id);
    println!("bitcoin address: {}", acct.account.btc_addr);

    acct.save_or_print()?;
    print_debug(&opt.net, &res)?;

    Ok(())
}
