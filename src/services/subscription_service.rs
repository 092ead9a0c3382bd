use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::RequestContext;
use crate::logging::AppLogger;
use crate::models::*;
use crate::repositories::SubscriptionRepository;
use crate::utils::{format_month_year, month_start};

/// 订阅相关的业务规则全部在此，传输层不直接访问仓储
#[derive(Clone)]
pub struct SubscriptionService {
    repo: Arc<dyn SubscriptionRepository>,
    logger: AppLogger,
    query_timeout: Option<Duration>,
}

impl SubscriptionService {
    pub fn new(
        repo: Arc<dyn SubscriptionRepository>,
        logger: AppLogger,
        query_timeout: Option<Duration>,
    ) -> Self {
        Self {
            repo,
            logger,
            query_timeout,
        }
    }

    /// 创建订阅，返回新记录的ID
    pub async fn create(&self, ctx: &RequestContext, input: SubscriptionInput) -> AppResult<i64> {
        let log = self.logger.scoped(&ctx.request_id);

        let new = validate_input(&input).inspect_err(|e| {
            log.warn(format_args!("create subscription rejected: {e}"));
        })?;

        let id = self
            .call(ctx, "create", self.repo.create(&new))
            .await?;

        log.info(format_args!(
            "created subscription id={id} service_name={} user_id={} start={} end={}",
            new.service_name,
            new.user_id,
            format_month_year(new.start_date),
            new.end_date
                .map(format_month_year)
                .unwrap_or_else(|| "open".to_string()),
        ));
        Ok(id)
    }

    pub async fn read_by_id(&self, ctx: &RequestContext, id: i64) -> AppResult<Subscription> {
        self.call(ctx, "read", self.repo.read_by_id(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("subscription {id} not found")))
    }

    /// 整行替换所有可变字段
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        input: SubscriptionInput,
    ) -> AppResult<()> {
        let log = self.logger.scoped(&ctx.request_id);

        let new = validate_input(&input).inspect_err(|e| {
            log.warn(format_args!("update subscription {id} rejected: {e}"));
        })?;

        let affected = self
            .call(ctx, "update", self.repo.update(id, &new))
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("subscription {id} not found")));
        }

        log.info(format_args!("updated subscription id={id}"));
        Ok(())
    }

    /// 删除不存在的ID不视为错误
    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> AppResult<()> {
        self.call(ctx, "delete", self.repo.delete(id)).await?;
        self.logger
            .scoped(&ctx.request_id)
            .info(format_args!("deleted subscription id={id}"));
        Ok(())
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        user_id: Option<&str>,
        service_name: Option<&str>,
        page: PageParams,
    ) -> AppResult<Vec<Subscription>> {
        let log = self.logger.scoped(&ctx.request_id);

        let user_id = page
            .validate()
            .and_then(|_| user_id.map(parse_user_id).transpose())
            .inspect_err(|e| {
                log.warn(format_args!("list subscriptions rejected: {e}"));
            })?;

        let filter = SubscriptionFilter {
            user_id,
            service_name: service_name.map(str::to_string),
            limit: page.get_limit(),
            offset: page.get_offset(),
        };
        self.call(ctx, "list", self.repo.list(&filter)).await
    }

    /// 汇总与 `[from, to]` 有交集的订阅价格，每条按全额计入
    pub async fn sum_by_period(
        &self,
        ctx: &RequestContext,
        from: &str,
        to: &str,
        user_id: Option<&str>,
        service_name: Option<&str>,
    ) -> AppResult<i64> {
        let log = self.logger.scoped(&ctx.request_id);

        let filter = build_period_filter(from, to, user_id, service_name).inspect_err(|e| {
            log.warn(format_args!("sum by period rejected: {e}"));
        })?;

        self.call(ctx, "sum", self.repo.sum_by_period(&filter)).await
    }

    /// 在超时限制内执行一次存储调用，丢弃返回的future即取消调用
    async fn call<T>(
        &self,
        ctx: &RequestContext,
        op: &str,
        fut: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        let result = match self.query_timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(res) => res,
                Err(_) => Err(AppError::StorageTimeout(format!(
                    "{op} did not complete within {}ms",
                    limit.as_millis()
                ))),
            },
            None => fut.await,
        };

        if let Err(e) = &result
            && e.is_storage()
        {
            self.logger
                .scoped(&ctx.request_id)
                .error(format_args!("{op} subscription failed: {e}"));
        }
        result
    }
}

fn parse_user_id(text: &str) -> AppResult<Uuid> {
    Uuid::parse_str(text)
        .map_err(|_| AppError::ValidationError(format!("invalid user_id: {text}")))
}

/// 校验并规范化输入，仓储只接收结果
fn validate_input(input: &SubscriptionInput) -> AppResult<NewSubscription> {
    let service_name = input.service_name.trim();
    if service_name.is_empty() {
        return Err(AppError::ValidationError(
            "service_name must not be empty".to_string(),
        ));
    }

    if input.price <= 0 {
        return Err(AppError::ValidationError(
            "price must be greater than 0".to_string(),
        ));
    }
    let price = i32::try_from(input.price).map_err(|_| {
        AppError::ValidationError(format!("price must not exceed {}", i32::MAX))
    })?;

    let user_id = parse_user_id(&input.user_id)?;
    let start_date = month_start(&input.start_date)?;

    // "" 与未提供等价，表示无结束日期
    let end_date = match input.end_date.as_deref() {
        Some(text) if !text.is_empty() => Some(month_start(text)?),
        _ => None,
    };

    if let Some(end) = end_date
        && end < start_date
    {
        return Err(AppError::ValidationError(
            "end_date must not be before start_date".to_string(),
        ));
    }

    Ok(NewSubscription {
        service_name: service_name.to_string(),
        price,
        user_id,
        start_date,
        end_date,
    })
}

fn build_period_filter(
    from: &str,
    to: &str,
    user_id: Option<&str>,
    service_name: Option<&str>,
) -> AppResult<PeriodFilter> {
    let from = month_start(from)?;
    let to = month_start(to)?;
    if from > to {
        return Err(AppError::ValidationError(
            "from must not be after to".to_string(),
        ));
    }

    Ok(PeriodFilter {
        from,
        to,
        user_id: user_id.map(parse_user_id).transpose()?,
        service_name: service_name.map(str::to_string),
    })
}
