use super::*;

pub(crate) fn exec(acct: &AccountFile, opt: OptGetChallenge) -> RcResult<()> {
    let client = acct.client(&opt.net)?;
    let res = client.get_challenge(&acct.account)?;

    println!("challenge id: {}", res.challenge_id);
    println!("encrypted challenge: {}", res.challenge);

    if opt.decrypt {
        let plain = decrypt_with_private_key(&acct.account.private_key, &res.challenge)
            .step(RcStep::ChallengeDecrypt)?;
        println!("challenge: {}", String::from_utf8_lossy(&plain));
    }

    print_debug(&opt.net, &res)?;

    Ok(())
}
