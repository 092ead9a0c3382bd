use actix_web::{App, HttpServer, middleware::Logger, web};
use std::sync::Arc;

use subscription_service::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    logging::{AppLogger, init_logger},
    middlewares::create_cors,
    repositories::SeaOrmSubscriptionRepository,
    services::SubscriptionService,
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // .env 不存在时忽略
    dotenvy::dotenv().ok();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration");

    init_logger(&config.logging.level);

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 创建服务
    let subscription_service = SubscriptionService::new(
        Arc::new(SeaOrmSubscriptionRepository::new(pool)),
        AppLogger::global(),
        config.database.query_timeout(),
    );

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(subscription_service.clone()))
            .configure(swagger_config)
            .configure(handlers::health_config)
            .service(web::scope("/api/v1").configure(handlers::subscription_config))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
