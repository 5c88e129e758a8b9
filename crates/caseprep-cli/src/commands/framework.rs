use crate::cli::PanelArgs;
use crate::commands::common::{edit_then_blur, finish, panel_for, resolve_text, CommandContext};
use crate::error::CliError;

/// Set the framework shown in a case or round panel; an empty editor clears it
pub async fn run_framework(
    target: &PanelArgs,
    text: &[String],
    ctx: &CommandContext,
) -> Result<(), CliError> {
    let mut sync = ctx.open(&target.id).await?;
    let panel = panel_for(target, sync.draft())?;
    let current = panel.framework(sync.draft())?.to_string();
    let framework = resolve_text(text, &current)?.unwrap_or_default();

    if framework != current {
        edit_then_blur(&mut sync, vec![panel.edit_framework(framework)])?;
        finish(&mut sync).await?;
    }
    println!("{}", sync.id());
    Ok(())
}
