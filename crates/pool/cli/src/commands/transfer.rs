//! Transfer-hook driver

use pool_types::AccountId;

use super::Context;
use crate::error::CliResult;
use crate::output::print_events;

/// Report a token movement through both hook phases.
pub fn execute(from: String, to: String, amount: u64, ctx: &Context) -> CliResult<()> {
    let caller = ctx.hook_caller();
    let from = AccountId::new(from);
    let to = AccountId::new(to);
    let mut ledger = ctx.store.open()?;

    ledger.before_transfer(&caller, &from, &to, amount)?;
    let events = ledger.after_transfer(&caller, &from, &to, amount)?;
    ctx.store.save(&ledger)?;

    if events.is_empty() {
        ctx.info(&format!("Transfer {from} -> {to} ({amount}) touches no wallet"));
    } else {
        ctx.success(&format!("Transfer {from} -> {to} ({amount}) booked"));
    }
    print_events(&events, ctx.output)
}
