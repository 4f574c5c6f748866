use super::*;

pub(crate) fn exec(acct: &mut AccountFile, opt: OptNewBtc) -> RcResult<()> {
    let rotation = if opt.i_understand_the_old_address_is_lost {
        RcAddressRotation::Acknowledged
    } else {
        RcAddressRotation::Unacknowledged
    };

    let client = acct.client(&opt.net)?;
    let res = client.request_new_address(&mut acct.account, rotation)?;

    println!("bitcoin address: {}", acct.account.btc_addr);

    acct.save_or_print()?;
    print_debug(&opt.net, &res)?;

    Ok(())
}
