use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// 已存储的订阅，日期始终为当月第一天
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Subscription {
    pub id: i64,
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    /// 最小货币单位，始终大于0
    #[schema(example = 400)]
    pub price: i32,
    pub user_id: Uuid,
    #[schema(value_type = String, example = "2025-07-01")]
    pub start_date: NaiveDate,
    /// 无结束日期时省略
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "2025-12-01")]
    pub end_date: Option<NaiveDate>,
}

/// 已校验、已规范化的订阅字段，可直接存储
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl NewSubscription {
    pub fn with_id(self, id: i64) -> Subscription {
        Subscription {
            id,
            service_name: self.service_name,
            price: self.price,
            user_id: self.user_id,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// 创建与更新的原始输入，日期格式为 `MM-YYYY`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionInput {
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i64,
    #[schema(example = "60601fee-2bf1-4721-ae6f-7636e79a0cba")]
    pub user_id: String,
    #[schema(example = "07-2025")]
    pub start_date: String,
    /// 省略、null 或 "" 均表示无结束日期
    #[serde(default)]
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

/// 列表查询的等值条件与分页，仅由服务层构造
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

/// 汇总使用的时间区间与等值条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodFilter {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}

impl PeriodFilter {
    /// `[start, end]` 是否与区间有交集
    pub fn overlaps(&self, start: NaiveDate, end: Option<NaiveDate>) -> bool {
        start <= self.to && end.is_none_or(|end| end >= self.from)
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubscriptionListQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub service_name: Option<String>,
    /// 0 或未提供时为100
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub offset: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubscriptionSumQuery {
    /// MM-YYYY，必填
    #[serde(default, deserialize_with = "empty_as_none")]
    pub from: Option<String>,
    /// MM-YYYY，必填
    #[serde(default, deserialize_with = "empty_as_none")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub service_name: Option<String>,
}

/// `?user_id=` 这类空值视为未提供
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionResponse {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionTotalResponse {
    pub total: i64,
}
