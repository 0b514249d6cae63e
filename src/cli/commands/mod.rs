mod check;
mod recent;
mod search;
mod show;
mod stats;

pub use check::cmd_check;
pub use recent::cmd_recent;
pub use search::{cmd_search_case, cmd_search_party};
pub use show::cmd_show_case;
pub use stats::cmd_stats;

use crate::config::Config;
use crate::db::Store;
use crate::models::CaseRecord;
use crate::scraper::DelhiHighCourtScraper;
use crate::services::SeaOrmCaseSearchService;
use std::sync::Arc;

async fn open_store(config: &Config) -> anyhow::Result<Store> {
    Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await
}

async fn open_service(config: &Config) -> anyhow::Result<SeaOrmCaseSearchService> {
    let store = open_store(config).await?;
    let scraper = Arc::new(DelhiHighCourtScraper::from_config(&config.scraper)?);
    Ok(SeaOrmCaseSearchService::new(store, scraper))
}

fn or_dash(value: Option<impl ToString>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn print_case(case: &CaseRecord) {
    println!("{}", case.case_number);
    println!("  {} vs {}", case.petitioner, case.respondent);
    println!(
        "  Status: {} | Filed: {} | Next hearing: {}",
        case.status,
        or_dash(case.filing_date),
        or_dash(case.next_hearing)
    );
    if let Some(judge) = &case.judge {
        println!("  Bench: {judge}");
    }
}
