//! Stored case listing

use super::{open_store, print_case};
use crate::config::Config;
use crate::models::CaseStatus;
use chrono::NaiveDate;

pub async fn cmd_recent(
    config: &Config,
    limit: u64,
    status: Option<&str>,
    filed: Option<(NaiveDate, NaiveDate)>,
) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    let cases = match (status, filed) {
        (_, Some((from, to))) => {
            let mut cases = store.cases_filed_between(from, to, limit).await?;
            if let Some(status) = status {
                let wanted = CaseStatus::from_raw(status);
                cases.retain(|c| c.status == wanted);
            }
            cases
        }
        (Some(status), None) => {
            store
                .cases_by_status(&CaseStatus::from_raw(status), limit)
                .await?
        }
        (None, None) => store.recent_cases(limit).await?,
    };

    if cases.is_empty() {
        println!("No stored cases.");
        println!();
        println!("Look one up with: casefetch search \"LPA 123/2023\"");
        return Ok(());
    }

    println!("Stored Cases ({} shown)", cases.len());
    println!("{:-<70}", "");
    for case in &cases {
        print_case(case);
        println!();
    }

    Ok(())
}
