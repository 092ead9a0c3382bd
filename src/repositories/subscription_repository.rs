use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use super::query::{TotalRow, list_query, sum_query};
use crate::entities::subscription_entity as subscriptions;
use crate::error::AppResult;
use crate::models::{NewSubscription, PeriodFilter, Subscription, SubscriptionFilter};

/// 订阅存储接口，只接收已校验、已规范化的数据
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// 插入一行并返回数据库分配的ID
    async fn create(&self, subscription: &NewSubscription) -> AppResult<i64>;
    /// 无匹配行时返回 `Ok(None)`，错误仅表示存储故障
    async fn read_by_id(&self, id: i64) -> AppResult<Option<Subscription>>;
    /// 整行替换，返回受影响行数
    async fn update(&self, id: i64, subscription: &NewSubscription) -> AppResult<u64>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn list(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>>;
    /// 与区间有交集的价格总和，无匹配时为0
    async fn sum_by_period(&self, filter: &PeriodFilter) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct SeaOrmSubscriptionRepository {
    pool: DatabaseConnection,
}

impl SeaOrmSubscriptionRepository {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SeaOrmSubscriptionRepository {
    async fn create(&self, subscription: &NewSubscription) -> AppResult<i64> {
        let am = subscriptions::ActiveModel {
            id: NotSet,
            service_name: Set(subscription.service_name.clone()),
            price: Set(subscription.price),
            user_id: Set(subscription.user_id),
            start_date: Set(subscription.start_date),
            end_date: Set(subscription.end_date),
        };
        let res = subscriptions::Entity::insert(am).exec(&self.pool).await?;
        Ok(res.last_insert_id)
    }

    async fn read_by_id(&self, id: i64) -> AppResult<Option<Subscription>> {
        let row = subscriptions::Entity::find_by_id(id).one(&self.pool).await?;
        Ok(row.map(Subscription::from))
    }

    async fn update(&self, id: i64, subscription: &NewSubscription) -> AppResult<u64> {
        // updated_at 由数据库触发器维护
        let res = subscriptions::Entity::update_many()
            .col_expr(
                subscriptions::Column::ServiceName,
                Expr::value(subscription.service_name.clone()),
            )
            .col_expr(subscriptions::Column::Price, Expr::value(subscription.price))
            .col_expr(subscriptions::Column::UserId, Expr::value(subscription.user_id))
            .col_expr(
                subscriptions::Column::StartDate,
                Expr::value(subscription.start_date),
            )
            .col_expr(subscriptions::Column::EndDate, Expr::value(subscription.end_date))
            .filter(subscriptions::Column::Id.eq(id))
            .exec(&self.pool)
            .await?;
        Ok(res.rows_affected)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        subscriptions::Entity::delete_by_id(id)
            .exec(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
        let rows = list_query(filter).all(&self.pool).await?;
        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    async fn sum_by_period(&self, filter: &PeriodFilter) -> AppResult<i64> {
        let total = sum_query(filter)
            .into_model::<TotalRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.total)
            .unwrap_or(0);
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;
    use uuid::Uuid;

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    async fn setup() -> SeaOrmSubscriptionRepository {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmSubscriptionRepository::new(db)
    }

    fn sub(name: &str, price: i32, user_id: Uuid, start: NaiveDate, end: Option<NaiveDate>) -> NewSubscription {
        NewSubscription {
            service_name: name.to_string(),
            price,
            user_id,
            start_date: start,
            end_date: end,
        }
    }

    #[tokio::test]
    async fn test_create_then_read_round_trip() {
        let repo = setup().await;
        let new = sub("Netflix", 599, Uuid::new_v4(), month(2024, 1), Some(month(2024, 6)));

        let id = repo.create(&new).await.unwrap();
        let found = repo.read_by_id(id).await.unwrap();

        assert_eq!(found, Some(new.with_id(id)));
    }

    #[tokio::test]
    async fn test_read_missing_is_absent_not_error() {
        let repo = setup().await;
        assert_eq!(repo.read_by_id(12345).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_replaces_row_and_reports_rows_affected() {
        let repo = setup().await;
        let uid = Uuid::new_v4();
        let id = repo
            .create(&sub("Netflix", 599, uid, month(2024, 1), Some(month(2024, 6))))
            .await
            .unwrap();

        let replacement = sub("Spotify", 299, uid, month(2024, 2), None);
        assert_eq!(repo.update(id, &replacement).await.unwrap(), 1);
        assert_eq!(
            repo.read_by_id(id).await.unwrap(),
            Some(replacement.clone().with_id(id))
        );

        assert_eq!(repo.update(id + 100, &replacement).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_is_unconditional() {
        let repo = setup().await;
        let id = repo
            .create(&sub("Netflix", 599, Uuid::new_v4(), month(2024, 1), None))
            .await
            .unwrap();

        repo.delete(id).await.unwrap();
        repo.delete(id).await.unwrap();
        assert_eq!(repo.read_by_id(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_filters_orders_and_pages() {
        let repo = setup().await;
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mut alice_ids = Vec::new();
        for name in ["Netflix", "Spotify", "Netflix"] {
            alice_ids.push(
                repo.create(&sub(name, 100, alice, month(2024, 1), None))
                    .await
                    .unwrap(),
            );
        }
        repo.create(&sub("Netflix", 100, bob, month(2024, 1), None))
            .await
            .unwrap();

        let all = repo
            .list(&SubscriptionFilter {
                limit: 100,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));

        let alice_netflix = repo
            .list(&SubscriptionFilter {
                user_id: Some(alice),
                service_name: Some("Netflix".to_string()),
                limit: 100,
                offset: 0,
            })
            .await
            .unwrap();
        let ids: Vec<i64> = alice_netflix.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![alice_ids[0], alice_ids[2]]);

        let page = repo
            .list(&SubscriptionFilter {
                user_id: Some(alice),
                limit: 1,
                offset: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, alice_ids[1]);

        let nobody = repo
            .list(&SubscriptionFilter {
                user_id: Some(Uuid::new_v4()),
                limit: 100,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(nobody.is_empty());
    }

    #[tokio::test]
    async fn test_sum_uses_overlap_rule() {
        let repo = setup().await;
        let uid = Uuid::new_v4();
        let window = PeriodFilter {
            from: month(2024, 1),
            to: month(2024, 12),
            user_id: None,
            service_name: None,
        };

        assert_eq!(repo.sum_by_period(&window).await.unwrap(), 0);

        // 无结束日期，且在区间前开始
        repo.create(&sub("Netflix", 400, uid, month(2023, 6), None))
            .await
            .unwrap();
        // 在区间之后开始
        repo.create(&sub("Netflix", 1000, uid, month(2025, 1), None))
            .await
            .unwrap();
        // 在区间之前结束
        repo.create(&sub("Spotify", 2000, uid, month(2022, 1), Some(month(2023, 12))))
            .await
            .unwrap();
        // 在区间第一个月结束
        repo.create(&sub("Spotify", 250, Uuid::new_v4(), month(2022, 1), Some(month(2024, 1))))
            .await
            .unwrap();

        assert_eq!(repo.sum_by_period(&window).await.unwrap(), 650);

        let only_user = PeriodFilter {
            user_id: Some(uid),
            ..window.clone()
        };
        assert_eq!(repo.sum_by_period(&only_user).await.unwrap(), 400);

        let only_spotify = PeriodFilter {
            service_name: Some("Spotify".to_string()),
            ..window
        };
        assert_eq!(repo.sum_by_period(&only_spotify).await.unwrap(), 250);
    }
}
