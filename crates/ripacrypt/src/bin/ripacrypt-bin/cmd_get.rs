use super::*;

pub(crate) fn exec(acct: &AccountFile, opt: OptGet) -> RcResult<()> {
    let client = acct.client(&opt.net)?;
    let res = client.get_crypt(&opt.crypt)?;
    let crypt = &res.crypt;

    println!("crypt id: {}", crypt.crypt_id);
    println!("description: {}", crypt.description);
    println!("created: {}", crypt.created_at);
    println!("last check-in: {}", crypt.last_checkin);
    println!("check-in duration: {}", crypt.checkin_duration);
    println!("miss count: {}", crypt.miss_count);
    println!("destroyed: {}", crypt.destroyed);

    if opt.decrypt {
        let plain = decrypt_crypt(crypt, &acct.account)?;
        println!("content:");
        use std::io::Write;
        let mut out = std::io::stdout().lock();
        out.write_all(&plain)?;
        out.flush()?;
    }

    print_debug(&opt.net, &res)?;

    Ok(())
}
