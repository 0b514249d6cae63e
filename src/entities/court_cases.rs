use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "court_cases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub case_number: String,
    pub petitioner: String,
    pub respondent: String,
    pub filing_date: Option<String>,
    pub status: String,
    pub court: String,
    pub case_type: String,
    pub judge: Option<String>,
    pub next_hearing: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::case_updates::Entity")]
    CaseUpdates,
}

impl Related<super::case_updates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CaseUpdates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
