use caseprep_core::Notice;

use crate::commands::common::{case_to_list_item, report_notices, CommandContext};
use crate::error::CliError;

pub async fn run_new(as_json: bool, ctx: &CommandContext) -> Result<(), CliError> {
    let backend = ctx.backend().await?;
    let case = match backend.service.create_case(&backend.identity).await {
        Ok(case) => case,
        Err(error) => {
            report_notices(&[Notice::create_failed(error.to_string())]);
            return Err(error.into());
        }
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&case_to_list_item(&case))?);
    } else {
        println!("{}", case.id);
    }
    Ok(())
}
