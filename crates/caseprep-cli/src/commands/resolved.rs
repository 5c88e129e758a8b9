use caseprep_core::sync::Edit;

use crate::commands::common::{edit_then_blur, finish, resolve_text, CommandContext};
use crate::error::CliError;

pub async fn run_resolved(id: &str, text: &[String], ctx: &CommandContext) -> Result<(), CliError> {
    let mut sync = ctx.open(id).await?;
    let current = sync.draft().resolved().to_string();
    let Some(resolved) = resolve_text(text, &current)? else {
        return Err(CliError::EmptyText);
    };

    if resolved != current {
        edit_then_blur(&mut sync, vec![Edit::Resolved(resolved)])?;
        finish(&mut sync).await?;
    }
    println!("{}", sync.id());
    Ok(())
}
