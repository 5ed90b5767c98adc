//! `expenses` table entity.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::Record;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new(record: &Record, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ActiveValue::NotSet,
            category: ActiveValue::Set(record.category.clone()),
            amount: ActiveValue::Set(record.amount),
            description: ActiveValue::Set(record.description.clone()),
            created_at: ActiveValue::Set(created_at),
        }
    }
}

impl From<Model> for Record {
    fn from(model: Model) -> Self {
        Self {
            category: model.category,
            amount: model.amount,
            description: model.description,
        }
    }
}
