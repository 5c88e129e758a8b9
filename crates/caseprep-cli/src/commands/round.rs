use caseprep_core::sync::{Edit, Structural};
use caseprep_core::Side;

use crate::cli::RoundCommands;
use crate::commands::common::{
    edit_then_blur, finish, position_to_index, resolve_text, CommandContext,
};
use crate::error::CliError;

pub async fn run_round(command: RoundCommands, ctx: &CommandContext) -> Result<(), CliError> {
    match command {
        RoundCommands::Add { id, side } => {
            let mut sync = ctx.open(&id).await?;
            sync.apply(Structural::AppendRound)?;
            let index = sync.draft().rounds().len().saturating_sub(1);
            let side = Side::from(side);
            if side != sync.draft().round(index)?.side {
                sync.apply(Structural::SetRoundSide { round: index, side })?;
            }
            finish(&mut sync).await?;
            println!("Added round {}", index + 1);
        }
        RoundCommands::Remove { id, round } => {
            let index = position_to_index(round)?;
            let mut sync = ctx.open(&id).await?;
            sync.apply(Structural::RemoveRound(index))?;
            finish(&mut sync).await?;
            println!("Removed round {round}");
        }
        RoundCommands::Side { id, round, side } => {
            let index = position_to_index(round)?;
            let mut sync = ctx.open(&id).await?;
            sync.apply(Structural::SetRoundSide {
                round: index,
                side: side.into(),
            })?;
            finish(&mut sync).await?;
            println!("Round {round} is now {}", Side::from(side).label());
        }
        RoundCommands::Notes { id, round, text } => {
            let index = position_to_index(round)?;
            let mut sync = ctx.open(&id).await?;
            let current = sync.draft().round(index)?.notes.clone();
            let notes = resolve_text(&text, &current)?.unwrap_or_default();
            if notes != current {
                edit_then_blur(&mut sync, vec![Edit::RoundNotes { round: index, text: notes }])?;
                finish(&mut sync).await?;
            }
            println!("Updated notes for round {round}");
        }
    }
    Ok(())
}
