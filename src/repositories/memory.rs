//! 用于开发和测试的内存订阅存储

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::SubscriptionRepository;
use crate::error::AppResult;
use crate::models::{NewSubscription, PeriodFilter, Subscription, SubscriptionFilter};

/// 按ID排序存储，遍历顺序即ID升序
pub struct InMemorySubscriptionRepository {
    rows: RwLock<BTreeMap<i64, Subscription>>,
    next_id: AtomicI64,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn matches(sub: &Subscription, user_id: Option<&uuid::Uuid>, service_name: Option<&str>) -> bool {
        user_id.is_none_or(|u| &sub.user_id == u)
            && service_name.is_none_or(|n| sub.service_name == n)
    }
}

impl Default for InMemorySubscriptionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(&self, subscription: &NewSubscription) -> AppResult<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.rows
            .write()
            .await
            .insert(id, subscription.clone().with_id(id));
        Ok(id)
    }

    async fn read_by_id(&self, id: i64) -> AppResult<Option<Subscription>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn update(&self, id: i64, subscription: &NewSubscription) -> AppResult<u64> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(row) => {
                *row = subscription.clone().with_id(id);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.rows.write().await.remove(&id);
        Ok(())
    }

    async fn list(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|s| Self::matches(s, filter.user_id.as_ref(), filter.service_name.as_deref()))
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    async fn sum_by_period(&self, filter: &PeriodFilter) -> AppResult<i64> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|s| Self::matches(s, filter.user_id.as_ref(), filter.service_name.as_deref()))
            .filter(|s| filter.overlaps(s.start_date, s.end_date))
            .map(|s| i64::from(s.price))
            .sum())
    }
}
