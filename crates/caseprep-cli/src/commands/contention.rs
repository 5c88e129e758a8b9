use caseprep_core::sync::{ContentionPart, Edit, Panel};

use crate::cli::{ContentionArgs, ContentionCommands};
use crate::commands::common::{
    edit_then_blur, finish, panel_for, position_to_index, CommandContext,
};
use crate::error::CliError;

pub async fn run_contention(
    command: ContentionCommands,
    ctx: &CommandContext,
) -> Result<(), CliError> {
    match command {
        ContentionCommands::Add { target, parts } => {
            let mut sync = ctx.open(&target.id).await?;
            let panel = panel_for(&target, sync.draft())?;
            sync.apply(panel.add_contention())?;
            let index = panel.contentions(sync.draft())?.len().saturating_sub(1);
            edit_then_blur(&mut sync, contention_edits(&panel, index, parts))?;
            finish(&mut sync).await?;
            println!("Added contention {}", index + 1);
        }
        ContentionCommands::Set {
            target,
            position,
            parts,
        } => {
            let index = position_to_index(position)?;
            let mut sync = ctx.open(&target.id).await?;
            let panel = panel_for(&target, sync.draft())?;
            edit_then_blur(&mut sync, contention_edits(&panel, index, parts))?;
            finish(&mut sync).await?;
            println!("Updated contention {position}");
        }
        ContentionCommands::Remove { target, position } => {
            let index = position_to_index(position)?;
            let mut sync = ctx.open(&target.id).await?;
            let panel = panel_for(&target, sync.draft())?;
            sync.apply(panel.remove_contention(index))?;
            finish(&mut sync).await?;
            println!("Removed contention {position}");
        }
    }
    Ok(())
}

pub fn contention_edits(panel: &Panel, index: usize, parts: ContentionArgs) -> Vec<Edit> {
    [
        (ContentionPart::Contention, parts.contention),
        (ContentionPart::Warrant, parts.warrant),
        (ContentionPart::Impact, parts.impact),
    ]
    .into_iter()
    .filter_map(|(part, text)| text.map(|text| panel.edit_contention(index, part, text)))
    .collect()
}
