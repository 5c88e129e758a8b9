use crate::commands::common::{
    case_to_list_item, format_case_lines, list_cases, CaseListItem, CommandContext,
};
use crate::error::CliError;

pub async fn run_list(as_json: bool, ctx: &CommandContext) -> Result<(), CliError> {
    let backend = ctx.backend().await?;
    let cases = list_cases(&backend).await?;

    if as_json {
        let json_items = cases
            .iter()
            .map(case_to_list_item)
            .collect::<Vec<CaseListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_case_lines(&cases) {
            println!("{line}");
        }
    }

    Ok(())
}
