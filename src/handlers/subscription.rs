use actix_web::{HttpResponse, ResponseError, Result, web};

use super::RequestContext;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::SubscriptionService;

fn parse_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| AppError::ValidationError(format!("invalid id: {raw}")))
}

/// 渲染结果并附加请求ID
fn respond(ctx: &RequestContext, result: AppResult<HttpResponse>) -> Result<HttpResponse> {
    let response = result.unwrap_or_else(|e| e.error_response());
    Ok(ctx.finish(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/subscriptions",
    tag = "subscriptions",
    request_body = SubscriptionInput,
    params(("X-Request-Id" = Option<String>, Header, description = "Correlation id, generated when absent")),
    responses(
        (status = 201, description = "Subscription created", body = CreateSubscriptionResponse),
        (status = 400, description = "Invalid input"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn create_subscription(
    service: web::Data<SubscriptionService>,
    ctx: RequestContext,
    body: web::Json<SubscriptionInput>,
) -> Result<HttpResponse> {
    let result = service
        .create(&ctx, body.into_inner())
        .await
        .map(|id| HttpResponse::Created().json(ApiResponse::success(CreateSubscriptionResponse { id })));
    respond(&ctx, result)
}

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = i64, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Subscription found", body = Subscription),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Subscription not found")
    )
)]
pub async fn get_subscription(
    service: web::Data<SubscriptionService>,
    ctx: RequestContext,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let result = async {
        let id = parse_id(&path)?;
        let sub = service.read_by_id(&ctx, id).await?;
        Ok::<_, AppError>(HttpResponse::Ok().json(ApiResponse::success(sub)))
    }
    .await;
    respond(&ctx, result)
}

#[utoipa::path(
    put,
    path = "/api/v1/subscriptions/{id}",
    tag = "subscriptions",
    request_body = SubscriptionInput,
    params(("id" = i64, Path, description = "Subscription id")),
    responses(
        (status = 204, description = "Subscription replaced"),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Subscription not found")
    )
)]
pub async fn update_subscription(
    service: web::Data<SubscriptionService>,
    ctx: RequestContext,
    path: web::Path<String>,
    body: web::Json<SubscriptionInput>,
) -> Result<HttpResponse> {
    let result = async {
        let id = parse_id(&path)?;
        service.update(&ctx, id, body.into_inner()).await?;
        Ok::<_, AppError>(HttpResponse::NoContent().finish())
    }
    .await;
    respond(&ctx, result)
}

#[utoipa::path(
    delete,
    path = "/api/v1/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = i64, Path, description = "Subscription id")),
    responses(
        (status = 204, description = "Subscription deleted (or never existed)"),
        (status = 400, description = "Malformed id")
    )
)]
pub async fn delete_subscription(
    service: web::Data<SubscriptionService>,
    ctx: RequestContext,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let result = async {
        let id = parse_id(&path)?;
        service.delete(&ctx, id).await?;
        Ok::<_, AppError>(HttpResponse::NoContent().finish())
    }
    .await;
    respond(&ctx, result)
}

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions",
    tag = "subscriptions",
    params(SubscriptionListQuery),
    responses(
        (status = 200, description = "Subscriptions ordered by id", body = [Subscription]),
        (status = 400, description = "Invalid filter")
    )
)]
pub async fn list_subscriptions(
    service: web::Data<SubscriptionService>,
    ctx: RequestContext,
    query: web::Query<SubscriptionListQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let page = PageParams::new(query.limit, query.offset);

    let result = service
        .list(
            &ctx,
            query.user_id.as_deref(),
            query.service_name.as_deref(),
            page,
        )
        .await
        .map(|subs| HttpResponse::Ok().json(ApiResponse::success(subs)));
    respond(&ctx, result)
}

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/sum",
    tag = "subscriptions",
    params(SubscriptionSumQuery),
    responses(
        (status = 200, description = "Total price of overlapping subscriptions", body = SubscriptionTotalResponse),
        (status = 400, description = "Missing or malformed period")
    )
)]
pub async fn sum_subscriptions(
    service: web::Data<SubscriptionService>,
    ctx: RequestContext,
    query: web::Query<SubscriptionSumQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();

    let result = async {
        let (Some(from), Some(to)) = (query.from.as_deref(), query.to.as_deref()) else {
            return Err(AppError::ValidationError(
                "from and to are required".to_string(),
            ));
        };
        let total = service
            .sum_by_period(
                &ctx,
                from,
                to,
                query.user_id.as_deref(),
                query.service_name.as_deref(),
            )
            .await?;
        Ok::<_, AppError>(HttpResponse::Ok().json(ApiResponse::success(
            SubscriptionTotalResponse { total },
        )))
    }
    .await;
    respond(&ctx, result)
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::ValidationError(format!("invalid request body: {err}")).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::ValidationError(format!("invalid query: {err}")).into()
            }))
            .route("", web::post().to(create_subscription))
            .route("", web::get().to(list_subscriptions))
            // 必须先于 /{id} 注册
            .route("/sum", web::get().to(sum_subscriptions))
            .route("/{id}", web::get().to(get_subscription))
            .route("/{id}", web::put().to(update_subscription))
            .route("/{id}", web::delete().to(delete_subscription)),
    );
}
