use super::open_store;
use crate::config::Config;

pub async fn cmd_stats(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let stats = store.search_statistics().await?;

    println!("Search Statistics");
    println!("{:-<40}", "");
    println!("Stored cases:          {}", stats.total_cases);
    println!("Total searches:        {}", stats.total_searches);
    println!("  by case number:      {}", stats.case_number_searches);
    println!("  by party name:       {}", stats.party_name_searches);

    let recent = store.recent_searches(5).await?;
    if !recent.is_empty() {
        println!();
        println!("Recent searches");
        for entry in recent {
            println!(
                "  {} [{}] {} ({} result(s))",
                entry.created_at, entry.search_type, entry.search_query, entry.results_count
            );
        }
    }

    Ok(())
}
