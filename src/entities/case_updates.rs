use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "case_updates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub case_id: String,
    pub field_name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::court_cases::Entity",
        from = "Column::CaseId",
        to = "super::court_cases::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    CourtCases,
}

impl Related<super::court_cases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourtCases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
