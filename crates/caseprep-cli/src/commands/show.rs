use caseprep_core::Side;

use crate::cli::SideArg;
use crate::commands::common::{render_case, CommandContext};
use crate::error::CliError;

pub async fn run_show(
    id: &str,
    side: Option<SideArg>,
    as_json: bool,
    ctx: &CommandContext,
) -> Result<(), CliError> {
    let sync = ctx.open(id).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&sync.case())?);
        return Ok(());
    }

    let sides = side.map_or_else(|| Side::ALL.to_vec(), |side| vec![side.into()]);
    print!("{}", render_case(sync.draft(), &sides)?);
    Ok(())
}
