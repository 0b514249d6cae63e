use crate::entities::{case_updates, court_cases, prelude::*};
use crate::models::{CaseRecord, CaseStatus, CaseUpdate};
use anyhow::Result;
use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CaseRepository {
    conn: DatabaseConnection,
}

impl CaseRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts a new case or updates the stored one with the same case number.
    ///
    /// Fields missing from `record` keep their stored values. Every changed
    /// field is recorded in `case_updates` within the same transaction.
    /// Returns the stored record.
    pub async fn upsert(&self, record: &CaseRecord) -> Result<CaseRecord> {
        let txn = self.conn.begin().await?;
        let now = chrono::Utc::now().to_rfc3339();

        let existing = Self::find_model(&txn, &record.case_number).await?;

        match existing {
            None => {
                let mut active_model = Self::to_active_model(record);
                active_model.created_at = Set(now.clone());
                active_model.updated_at = Set(now);

                CourtCases::insert(active_model)
                    .on_conflict(
                        sea_orm::sea_query::OnConflict::column(court_cases::Column::CaseNumber)
                            .update_columns([
                                court_cases::Column::Petitioner,
                                court_cases::Column::Respondent,
                                court_cases::Column::FilingDate,
                                court_cases::Column::Status,
                                court_cases::Column::Court,
                                court_cases::Column::CaseType,
                                court_cases::Column::Judge,
                                court_cases::Column::NextHearing,
                                court_cases::Column::UpdatedAt,
                            ])
                            .to_owned(),
                    )
                    .exec_without_returning(&txn)
                    .await?;
            }
            Some(model) => {
                let stored = Self::map_model(model.clone());
                let merged = record.filled_from(&stored);
                let changes: Vec<(&'static str, Option<String>, Option<String>)> = stored
                    .tracked_fields()
                    .into_iter()
                    .zip(merged.tracked_fields())
                    .filter(|((_, old), (_, new))| old != new)
                    .map(|((field, old), (_, new))| (field, old, new))
                    .collect();

                if !changes.is_empty() {
                    let mut active_model = Self::to_active_model(&merged);
                    active_model.id = Set(model.id.clone());
                    active_model.created_at = Set(model.created_at.clone());
                    active_model.updated_at = Set(now.clone());
                    CourtCases::update(active_model).exec(&txn).await?;

                    let audit = changes.into_iter().map(|(field, old, new)| {
                        case_updates::ActiveModel {
                            case_id: Set(model.id.clone()),
                            field_name: Set(field.to_string()),
                            old_value: Set(old),
                            new_value: Set(new),
                            updated_at: Set(now.clone()),
                            ..Default::default()
                        }
                    });
                    CaseUpdates::insert_many(audit)
                        .exec_without_returning(&txn)
                        .await?;
                }
            }
        }

        let stored = Self::find_model(&txn, &record.case_number)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Case {} vanished after upsert", record.case_number))?;

        txn.commit().await?;
        Ok(Self::map_model(stored))
    }

    async fn find_model<C: ConnectionTrait>(
        conn: &C,
        case_number: &str,
    ) -> Result<Option<court_cases::Model>> {
        Ok(CourtCases::find()
            .filter(court_cases::Column::CaseNumber.eq(case_number))
            .one(conn)
            .await?)
    }

    pub async fn get_by_number(&self, case_number: &str) -> Result<Option<CaseRecord>> {
        Ok(Self::find_model(&self.conn, case_number)
            .await?
            .map(Self::map_model))
    }

    /// Cases whose number contains `fragment`.
    pub async fn search_by_number(&self, fragment: &str, limit: u64) -> Result<Vec<CaseRecord>> {
        let rows = CourtCases::find()
            .filter(court_cases::Column::CaseNumber.contains(fragment))
            .order_by_asc(court_cases::Column::CaseNumber)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    /// Case-insensitive substring match on either party, newest filing first.
    pub async fn search_by_party(&self, name: &str, limit: u64) -> Result<Vec<CaseRecord>> {
        let rows = CourtCases::find()
            .filter(
                Condition::any()
                    .add(court_cases::Column::Petitioner.contains(name))
                    .add(court_cases::Column::Respondent.contains(name)),
            )
            .order_by_desc(court_cases::Column::FilingDate)
            .order_by_asc(court_cases::Column::CaseNumber)
            .limit(limit)
            .all(&self.conn)
            .await?;

        let folded = name.to_lowercase();
        Ok(rows
            .into_iter()
            .map(Self::map_model)
            .filter(|record| record.involves_party(&folded))
            .collect())
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<CaseRecord>> {
        let rows = CourtCases::find()
            .order_by_desc(court_cases::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn by_status(&self, status: &CaseStatus, limit: u64) -> Result<Vec<CaseRecord>> {
        let rows = CourtCases::find()
            .filter(court_cases::Column::Status.eq(status.to_string()))
            .order_by_desc(court_cases::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    /// Cases filed within `[from, to]`, oldest first.
    pub async fn by_filing_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: u64,
    ) -> Result<Vec<CaseRecord>> {
        let rows = CourtCases::find()
            .filter(court_cases::Column::FilingDate.gte(from.format(DATE_FORMAT).to_string()))
            .filter(court_cases::Column::FilingDate.lte(to.format(DATE_FORMAT).to_string()))
            .order_by_asc(court_cases::Column::FilingDate)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(CourtCases::find().count(&self.conn).await?)
    }

    /// Change history of one case, oldest first.
    pub async fn updates_for(&self, case_id: &str) -> Result<Vec<CaseUpdate>> {
        let rows = CaseUpdates::find()
            .filter(case_updates::Column::CaseId.eq(case_id))
            .order_by_asc(case_updates::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| CaseUpdate {
                id: row.id,
                case_id: row.case_id,
                field_name: row.field_name,
                old_value: row.old_value,
                new_value: row.new_value,
                updated_at: row.updated_at,
            })
            .collect())
    }

    fn to_active_model(record: &CaseRecord) -> court_cases::ActiveModel {
        court_cases::ActiveModel {
            id: Set(record.id.clone()),
            case_number: Set(record.case_number.clone()),
            petitioner: Set(record.petitioner.clone()),
            respondent: Set(record.respondent.clone()),
            filing_date: Set(record.filing_date.map(|d| d.format(DATE_FORMAT).to_string())),
            status: Set(record.status.to_string()),
            court: Set(record.court.clone()),
            case_type: Set(record.case_type.clone()),
            judge: Set(record.judge.clone()),
            next_hearing: Set(record.next_hearing.map(|d| d.format(DATE_FORMAT).to_string())),
            created_at: Set(record.created_at.clone()),
            updated_at: Set(record.updated_at.clone()),
        }
    }

    fn map_model(model: court_cases::Model) -> CaseRecord {
        let parse = |s: Option<String>| {
            s.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok())
        };

        CaseRecord {
            id: model.id,
            case_number: model.case_number,
            petitioner: model.petitioner,
            respondent: model.respondent,
            filing_date: parse(model.filing_date),
            status: CaseStatus::from_raw(&model.status),
            court: model.court,
            case_type: model.case_type,
            judge: model.judge,
            next_hearing: parse(model.next_hearing),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
