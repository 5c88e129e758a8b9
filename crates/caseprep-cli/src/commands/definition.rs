use caseprep_core::sync::{DefinitionPart, Edit, Panel};

use crate::cli::DefinitionCommands;
use crate::commands::common::{
    edit_then_blur, finish, panel_for, position_to_index, CommandContext,
};
use crate::error::CliError;

pub async fn run_definition(
    command: DefinitionCommands,
    ctx: &CommandContext,
) -> Result<(), CliError> {
    match command {
        DefinitionCommands::Add {
            target,
            term,
            value,
        } => {
            let mut sync = ctx.open(&target.id).await?;
            let panel = panel_for(&target, sync.draft())?;
            sync.apply(panel.add_definition())?;
            let index = panel.definitions(sync.draft())?.len().saturating_sub(1);
            edit_then_blur(&mut sync, definition_edits(&panel, index, term, value))?;
            finish(&mut sync).await?;
            println!("Added definition {}", index + 1);
        }
        DefinitionCommands::Set {
            target,
            position,
            term,
            value,
        } => {
            let index = position_to_index(position)?;
            let mut sync = ctx.open(&target.id).await?;
            let panel = panel_for(&target, sync.draft())?;
            edit_then_blur(&mut sync, definition_edits(&panel, index, term, value))?;
            finish(&mut sync).await?;
            println!("Updated definition {position}");
        }
        DefinitionCommands::Remove { target, position } => {
            let index = position_to_index(position)?;
            let mut sync = ctx.open(&target.id).await?;
            let panel = panel_for(&target, sync.draft())?;
            sync.apply(panel.remove_definition(index))?;
            finish(&mut sync).await?;
            println!("Removed definition {position}");
        }
    }
    Ok(())
}

fn definition_edits(
    panel: &Panel,
    index: usize,
    term: Option<String>,
    value: Option<String>,
) -> Vec<Edit> {
    let mut edits = Vec::new();
    if let Some(term) = term {
        edits.push(panel.edit_definition(index, DefinitionPart::Term, term));
    }
    if let Some(value) = value {
        edits.push(panel.edit_definition(index, DefinitionPart::Value, value));
    }
    edits
}
