use crate::entities::{prelude::*, search_logs};
use crate::models::{Requester, SearchLogEntry, SearchStatistics, SearchType};
use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

pub struct SearchLogRepository {
    conn: DatabaseConnection,
}

impl SearchLogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(
        &self,
        search_type: SearchType,
        query: &str,
        results_count: usize,
        requester: &Requester,
    ) -> Result<()> {
        let active_model = search_logs::ActiveModel {
            search_type: Set(search_type.as_str().to_string()),
            search_query: Set(query.to_string()),
            results_count: Set(i32::try_from(results_count).unwrap_or(i32::MAX)),
            ip_address: Set(requester.ip_address.clone()),
            user_agent: Set(requester.user_agent.clone()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        SearchLogs::insert(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<SearchLogEntry>> {
        let rows = SearchLogs::find()
            .order_by_desc(search_logs::Column::CreatedAt)
            .order_by_desc(search_logs::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                Some(SearchLogEntry {
                    id: row.id,
                    search_type: SearchType::parse(&row.search_type)?,
                    search_query: row.search_query,
                    results_count: u32::try_from(row.results_count).unwrap_or(0),
                    ip_address: row.ip_address,
                    user_agent: row.user_agent,
                    created_at: row.created_at,
                })
            })
            .collect())
    }

    async fn count_of(&self, search_type: SearchType) -> Result<u64> {
        Ok(SearchLogs::find()
            .filter(search_logs::Column::SearchType.eq(search_type.as_str()))
            .count(&self.conn)
            .await?)
    }

    /// Search totals; `total_cases` is left for the caller to fill.
    pub async fn statistics(&self) -> Result<SearchStatistics> {
        Ok(SearchStatistics {
            total_cases: 0,
            total_searches: SearchLogs::find().count(&self.conn).await?,
            case_number_searches: self.count_of(SearchType::CaseNumber).await?,
            party_name_searches: self.count_of(SearchType::PartyName).await?,
        })
    }
}
