use super::*;

pub(crate) fn exec(acct: &AccountFile, opt: OptCheckin) -> RcResult<()> {
    let client = acct.client(&opt.net)?;
    let res = client.check_in(&acct.account, &opt.crypt)?;

    println!("{}", res.status.message);
    print_debug(&opt.net, &res)?;

    Ok(())
}
