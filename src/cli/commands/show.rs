use super::{open_service, or_dash, print_case};
use crate::config::Config;
use crate::services::CaseSearchService;

pub async fn cmd_show_case(config: &Config, case_number: &str) -> anyhow::Result<()> {
    let service = open_service(config).await?;

    let Some(detail) = service.get_case(case_number).await? else {
        println!("Case '{case_number}' is not stored.");
        println!();
        println!("Look it up with: casefetch search \"{case_number}\"");
        return Ok(());
    };

    print_case(&detail.case);
    println!("  Court: {} | Type: {}", detail.case.court, detail.case.case_type);
    println!("  First seen: {}", detail.case.created_at);
    println!("  Last updated: {}", detail.case.updated_at);

    if detail.updates.is_empty() {
        return Ok(());
    }

    println!();
    println!("History ({} change(s))", detail.updates.len());
    println!("{:-<70}", "");
    for update in &detail.updates {
        println!(
            "{}  {}: {} -> {}",
            update.updated_at,
            update.field_name,
            or_dash(update.old_value.as_deref()),
            or_dash(update.new_value.as_deref())
        );
    }

    Ok(())
}
