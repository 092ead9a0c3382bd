//! 分页相关的数据结构

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// 未指定或为0时的默认条数，不存在无上限的查询
pub const DEFAULT_LIMIT: u64 = 100;

/// 数据库以有符号64位整数绑定 LIMIT/OFFSET
pub const MAX_PAGE_VALUE: u64 = i64::MAX as u64;

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, ToSchema)]
pub struct PageParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl PageParams {
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self { limit, offset }
    }

    pub fn get_limit(&self) -> u64 {
        match self.limit {
            None | Some(0) => DEFAULT_LIMIT,
            Some(n) => n,
        }
    }

    pub fn get_offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }

    /// 校验 limit/offset 是否在可绑定范围内
    pub fn validate(&self) -> AppResult<()> {
        if self.get_limit() > MAX_PAGE_VALUE {
            return Err(AppError::ValidationError(format!(
                "limit must not exceed {MAX_PAGE_VALUE}"
            )));
        }
        if self.get_offset() > MAX_PAGE_VALUE {
            return Err(AppError::ValidationError(format!(
                "offset must not exceed {MAX_PAGE_VALUE}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params() {
        let params = PageParams::new(Some(10), Some(20));
        assert_eq!(params.get_limit(), 10);
        assert_eq!(params.get_offset(), 20);
    }

    #[test]
    fn test_page_params_defaults() {
        let params = PageParams::default();
        assert_eq!(params.get_limit(), DEFAULT_LIMIT);
        assert_eq!(params.get_offset(), 0);
    }

    #[test]
    fn test_zero_limit_is_capped_not_unbounded() {
        let params = PageParams::new(Some(0), Some(0));
        assert_eq!(params.get_limit(), 100);
        assert_eq!(params.get_offset(), 0);
    }

    #[test]
    fn test_values_beyond_signed_range_are_rejected() {
        assert!(PageParams::new(Some(MAX_PAGE_VALUE), Some(MAX_PAGE_VALUE))
            .validate()
            .is_ok());

        for params in [
            PageParams::new(Some(u64::MAX), None),
            PageParams::new(Some(MAX_PAGE_VALUE + 1), None),
            PageParams::new(None, Some(u64::MAX)),
        ] {
            assert!(matches!(
                params.validate(),
                Err(AppError::ValidationError(_))
            ));
        }
    }
}
