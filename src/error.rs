use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ApiResponse;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Storage timeout: {0}")]
    StorageTimeout(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// 由存储层而非调用方输入引起的错误
    pub fn is_storage(&self) -> bool {
        matches!(self, AppError::DatabaseError(_) | AppError::StorageTimeout(_))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StorageTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::ValidationError(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::DatabaseError(_) => ("DATABASE_ERROR", "Database error".to_string()),
            AppError::StorageTimeout(_) => (
                "STORAGE_TIMEOUT",
                "Storage did not respond in time".to_string(),
            ),
            AppError::ConfigError(_) => {
                // 存储与校验错误已由服务层带请求ID记录
                log::error!("Internal error: {self}");
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        HttpResponse::build(self.status_code())
            .json(ApiResponse::<()>::error(error_code.to_string(), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::ValidationError("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("subscription".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::DatabaseError(sea_orm::DbErr::Custom("down".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::StorageTimeout("list".into()).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_storage_grouping() {
        assert!(AppError::DatabaseError(sea_orm::DbErr::Custom("x".into())).is_storage());
        assert!(AppError::StorageTimeout("x".into()).is_storage());
        assert!(!AppError::ValidationError("x".into()).is_storage());
        assert!(!AppError::NotFound("x".into()).is_storage());
    }

    #[actix_web::test]
    async fn test_database_details_not_leaked() {
        let resp = AppError::DatabaseError(sea_orm::DbErr::Custom("password=hunter2".into()))
            .error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "DATABASE_ERROR");
        assert!(!body.to_string().contains("hunter2"));
    }

    #[actix_web::test]
    async fn test_only_startup_errors_log_globally() {
        use crate::logging::MemorySink;
        use std::sync::OnceLock;

        static SINK: OnceLock<&'static MemorySink> = OnceLock::new();
        let sink = *SINK.get_or_init(|| Box::leak(Box::new(MemorySink::default())));
        let _ = log::set_logger(sink);
        log::set_max_level(log::LevelFilter::Trace);

        AppError::DatabaseError(sea_orm::DbErr::Custom("db-marker-7f3a".into())).error_response();
        AppError::StorageTimeout("timeout-marker-7f3a".into()).error_response();
        AppError::ValidationError("validation-marker-7f3a".into()).error_response();
        AppError::ConfigError("config-marker-7f3a".into()).error_response();

        let entries = sink.entries();
        for marker in ["db-marker-7f3a", "timeout-marker-7f3a", "validation-marker-7f3a"] {
            assert!(
                !entries.iter().any(|(_, msg)| msg.contains(marker)),
                "{marker} should be logged by the service, not here"
            );
        }
        assert!(entries
            .iter()
            .any(|(level, msg)| *level == log::Level::Error && msg.contains("config-marker-7f3a")));
    }
}
