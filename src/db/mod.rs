use crate::models::{
    CaseRecord, CaseStatus, CaseUpdate, Requester, SearchLogEntry, SearchStatistics, SearchType,
};
use anyhow::Result;
use chrono::NaiveDate;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Each pooled connection to an in-memory SQLite database is a separate database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn case_repo(&self) -> repositories::cases::CaseRepository {
        repositories::cases::CaseRepository::new(self.conn.clone())
    }

    fn search_log_repo(&self) -> repositories::search_logs::SearchLogRepository {
        repositories::search_logs::SearchLogRepository::new(self.conn.clone())
    }

    pub async fn upsert_case(&self, record: &CaseRecord) -> Result<CaseRecord> {
        self.case_repo().upsert(record).await
    }

    pub async fn get_case_by_number(&self, case_number: &str) -> Result<Option<CaseRecord>> {
        self.case_repo().get_by_number(case_number).await
    }

    pub async fn search_cases_by_number(
        &self,
        fragment: &str,
        limit: u64,
    ) -> Result<Vec<CaseRecord>> {
        self.case_repo().search_by_number(fragment, limit).await
    }

    pub async fn search_cases_by_party(&self, name: &str, limit: u64) -> Result<Vec<CaseRecord>> {
        self.case_repo().search_by_party(name, limit).await
    }

    pub async fn recent_cases(&self, limit: u64) -> Result<Vec<CaseRecord>> {
        self.case_repo().recent(limit).await
    }

    pub async fn cases_by_status(&self, status: &CaseStatus, limit: u64) -> Result<Vec<CaseRecord>> {
        self.case_repo().by_status(status, limit).await
    }

    pub async fn cases_filed_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: u64,
    ) -> Result<Vec<CaseRecord>> {
        self.case_repo().by_filing_date_range(from, to, limit).await
    }

    pub async fn case_updates(&self, case_id: &str) -> Result<Vec<CaseUpdate>> {
        self.case_repo().updates_for(case_id).await
    }

    pub async fn log_search(
        &self,
        search_type: SearchType,
        query: &str,
        results_count: usize,
        requester: &Requester,
    ) -> Result<()> {
        self.search_log_repo()
            .add(search_type, query, results_count, requester)
            .await
    }

    pub async fn recent_searches(&self, limit: u64) -> Result<Vec<SearchLogEntry>> {
        self.search_log_repo().recent(limit).await
    }

    pub async fn search_statistics(&self) -> Result<SearchStatistics> {
        let mut stats = self.search_log_repo().statistics().await?;
        stats.total_cases = self.case_repo().count().await?;
        Ok(stats)
    }
}
