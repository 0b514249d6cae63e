//! Case number and party name search handlers

use super::{open_service, print_case};
use crate::config::Config;
use crate::models::Requester;
use crate::services::{CaseSearchService, ResultSource, SearchResponse};

fn print_response(response: &SearchResponse) {
    if let Some(message) = &response.message {
        println!("{message}");
    }

    if response.cases.is_empty() {
        return;
    }

    let label = match response.source {
        ResultSource::Cache => "stored",
        ResultSource::Live => "live",
        ResultSource::Fallback => "sample",
    };
    println!("Found {} case(s) [{label}]", response.cases.len());
    println!("{:-<70}", "");

    for case in &response.cases {
        print_case(case);
        println!();
    }

    if response.skipped > 0 {
        println!("({} result row(s) could not be read)", response.skipped);
    }
}

pub async fn cmd_search_case(config: &Config, query: &str, refresh: bool) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let response = service
        .search_by_case_number(query, refresh, &Requester::default())
        .await?;
    print_response(&response);
    Ok(())
}

pub async fn cmd_search_party(config: &Config, name: &str, refresh: bool) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let response = service
        .search_by_party_name(name, refresh, &Requester::default())
        .await?;
    print_response(&response);
    Ok(())
}
