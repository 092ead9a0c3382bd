use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

use crate::models::Subscription;
use crate::utils::truncate_to_month;

/// `created_at`/`updated_at` 由数据库（列默认值与更新触发器）维护，此处不映射
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Subscription {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            service_name: m.service_name,
            price: m.price,
            user_id: m.user_id,
            start_date: truncate_to_month(m.start_date),
            end_date: m.end_date.map(truncate_to_month),
        }
    }
}
