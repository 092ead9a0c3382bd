use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;

use crate::error::{AppError, AppResult};

pub const MONTH_YEAR_PATTERN: &str = "MM-YYYY";

// 仅接受ASCII数字，`\d` 会匹配其他Unicode数字
static MONTH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{2})-([0-9]{4})$").unwrap());

/// 将 `MM-YYYY` 解析为该月第一天零点（UTC）
pub fn parse_month_year(input: &str) -> AppResult<DateTime<Utc>> {
    let invalid = || {
        AppError::ValidationError(format!(
            "invalid date format: {input}, expected {MONTH_YEAR_PATTERN}"
        ))
    };

    let caps = MONTH_YEAR_RE.captures(input).ok_or_else(invalid)?;
    let month: u32 = caps[1].parse().map_err(|_| invalid())?;
    let year: i32 = caps[2].parse().map_err(|_| invalid())?;

    let date = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// 将 `MM-YYYY` 解析为该月第一天的日期
pub fn month_start(input: &str) -> AppResult<NaiveDate> {
    parse_month_year(input).map(|ts| ts.date_naive())
}

/// 截断到当月第一天
pub fn truncate_to_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// 格式化为 `MM-YYYY`
pub fn format_month_year(date: NaiveDate) -> String {
    format!("{:02}-{:04}", date.month(), date.year())
}
