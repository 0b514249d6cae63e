use crate::entities::{case_updates, court_cases, prelude::*, search_logs};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const CASE_INDEXES: &[(&str, court_cases::Column)] = &[
    ("idx_court_cases_petitioner", court_cases::Column::Petitioner),
    ("idx_court_cases_respondent", court_cases::Column::Respondent),
    ("idx_court_cases_filing_date", court_cases::Column::FilingDate),
    ("idx_court_cases_status", court_cases::Column::Status),
    ("idx_court_cases_created_at", court_cases::Column::CreatedAt),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, column) in CASE_INDEXES {
            manager
                .create_index(
                    Index::create()
                        .name(*name)
                        .table(CourtCases)
                        .col(*column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_search_logs_created_at")
                    .table(SearchLogs)
                    .col(search_logs::Column::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_case_updates_case_id")
                    .table(CaseUpdates)
                    .col(case_updates::Column::CaseId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, _) in CASE_INDEXES {
            manager
                .drop_index(Index::drop().name(*name).table(CourtCases).to_owned())
                .await?;
        }

        manager
            .drop_index(
                Index::drop()
                    .name("idx_search_logs_created_at")
                    .table(SearchLogs)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_case_updates_case_id")
                    .table(CaseUpdates)
                    .to_owned(),
            )
            .await
    }
}
