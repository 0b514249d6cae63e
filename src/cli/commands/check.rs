use crate::config::Config;
use crate::scraper::DelhiHighCourtScraper;

pub async fn cmd_check(config: &Config) -> anyhow::Result<()> {
    let scraper = DelhiHighCourtScraper::from_config(&config.scraper)?;

    println!("Checking {} ...", config.scraper.base_url);
    let report = scraper.test_connection().await;

    if !report.reachable {
        println!(
            "✗ Unreachable after {} ms: {}",
            report.elapsed_ms,
            report.error.as_deref().unwrap_or("unknown error")
        );
        return Ok(());
    }

    println!(
        "✓ Reachable (HTTP {}) in {} ms",
        report.status.unwrap_or_default(),
        report.elapsed_ms
    );
    if let Some(title) = &report.title {
        println!("  Title: {title}");
    }
    println!("  Forms on page: {}", report.form_count);
    if report.has_captcha {
        if config.scraper.use_mock_fallback {
            println!("  ⚠ CAPTCHA detected. Case searches will fall back to sample data.");
        } else {
            println!("  ⚠ CAPTCHA detected. Live searches will be reported as blocked.");
        }
    }

    Ok(())
}
