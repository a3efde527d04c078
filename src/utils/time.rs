use chrono::{DateTime, Utc};

/// 当前时间，截断到秒
///
/// 数据库以 unix 秒存储时间戳，两种存储后端返回的时间保持一致。
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_has_no_subsecond_part() {
        assert_eq!(now().timestamp_subsec_nanos(), 0);
    }
}
