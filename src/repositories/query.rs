//! 将过滤条件转换为参数化的 `SELECT` 语句
//!
//! 用户输入一律作为绑定参数。谓词按固定顺序追加（先时间区间，再 `user_id`，
//! 最后 `service_name`），占位符编号与此顺序一致。

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select};
use uuid::Uuid;

use crate::entities::subscription_entity as subscriptions;
use crate::models::{PeriodFilter, SubscriptionFilter};

pub const TOTAL_ALIAS: &str = "total";

// 统一转换为BIGINT，各数据库返回类型一致（Postgres 中 SUM(int4) 为 int8）
const TOTAL_PRICE_EXPR: &str = r#"CAST(COALESCE(SUM("price"), 0) AS BIGINT)"#;

#[derive(Debug, sea_orm::FromQueryResult)]
pub struct TotalRow {
    pub total: i64,
}

/// 追加可选的等值条件，无条件时不生成 `WHERE`
fn with_equality_filters(
    select: Select<subscriptions::Entity>,
    user_id: Option<Uuid>,
    service_name: Option<&str>,
) -> Select<subscriptions::Entity> {
    let mut select = select;
    if let Some(uid) = user_id {
        select = select.filter(subscriptions::Column::UserId.eq(uid));
    }
    if let Some(name) = service_name {
        select = select.filter(subscriptions::Column::ServiceName.eq(name));
    }
    select
}

/// `start_date <= to AND (end_date IS NULL OR end_date >= from)`
pub fn overlap_condition(filter: &PeriodFilter) -> Condition {
    Condition::all()
        .add(subscriptions::Column::StartDate.lte(filter.to))
        .add(
            Condition::any()
                .add(subscriptions::Column::EndDate.is_null())
                .add(subscriptions::Column::EndDate.gte(filter.from)),
        )
}

/// 列表查询：过滤、`ORDER BY id ASC`，始终带 `LIMIT`
pub fn list_query(filter: &SubscriptionFilter) -> Select<subscriptions::Entity> {
    let mut select = with_equality_filters(
        subscriptions::Entity::find(),
        filter.user_id,
        filter.service_name.as_deref(),
    )
    .order_by_asc(subscriptions::Column::Id)
    .limit(filter.limit);

    if filter.offset > 0 {
        select = select.offset(filter.offset);
    }
    select
}

/// 汇总查询，返回单列 `total`，永不为NULL
pub fn sum_query(filter: &PeriodFilter) -> Select<subscriptions::Entity> {
    let select = subscriptions::Entity::find()
        .select_only()
        .column_as(Expr::cust(TOTAL_PRICE_EXPR), TOTAL_ALIAS)
        .filter(overlap_condition(filter));

    with_equality_filters(select, filter.user_id, filter.service_name.as_deref())
}
