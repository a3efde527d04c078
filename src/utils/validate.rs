pub const MAX_SCORE: i64 = 100;
pub const MAX_REJECT_REASON_CHARS: usize = 500;
pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTENT_CHARS: usize = 20_000;
pub const MAX_ATTACHMENTS: usize = 20;

/// 分数必须是 0 到 100 之间的整数
///
/// 接受 JSON 值，浮点数、字符串等非整数类型都视为校验失败。
pub fn validate_score(score: Option<&serde_json::Value>) -> Result<i32, &'static str> {
    let value = score.ok_or("Score is required when approving")?;
    let score = value.as_i64().ok_or("Score must be an integer")?;
    if !(0..=MAX_SCORE).contains(&score) {
        return Err("Score must be between 0 and 100");
    }
    Ok(score as i32)
}

pub fn validate_reject_reason(reason: Option<&str>) -> Result<String, &'static str> {
    let reason = reason.ok_or("Reject reason is required when rejecting")?;
    if reason.trim().is_empty() {
        return Err("Reject reason must not be empty");
    }
    // 按字符计数，中文理由与英文理由同等对待
    if reason.chars().count() > MAX_REJECT_REASON_CHARS {
        return Err("Reject reason must be at most 500 characters");
    }
    Ok(reason.to_string())
}

pub fn validate_title(title: &str) -> Result<(), &'static str> {
    let len = title.trim().chars().count();
    if len == 0 || len > MAX_TITLE_CHARS {
        return Err("Title length must be between 1 and 200 characters");
    }
    Ok(())
}

pub fn validate_content(content: &str) -> Result<(), &'static str> {
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err("Content must be at most 20000 characters");
    }
    Ok(())
}

pub fn validate_attachments(attachments: &[String]) -> Result<(), &'static str> {
    if attachments.len() > MAX_ATTACHMENTS {
        return Err("At most 20 attachments are allowed");
    }
    if attachments.iter().any(|a| a.trim().is_empty()) {
        return Err("Attachment reference must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_score_bounds() {
        assert_eq!(validate_score(Some(&json!(0))), Ok(0));
        assert_eq!(validate_score(Some(&json!(100))), Ok(100));
        assert!(validate_score(Some(&json!(150))).is_err());
        assert!(validate_score(Some(&json!(-1))).is_err());
        assert!(validate_score(None).is_err());
    }

    #[test]
    fn test_score_must_be_integer() {
        assert!(validate_score(Some(&json!(85.5))).is_err());
        assert!(validate_score(Some(&json!("85"))).is_err());
        assert!(validate_score(Some(&json!(null))).is_err());
    }

    #[test]
    fn test_reject_reason_rules() {
        assert!(validate_reject_reason(None).is_err());
        assert!(validate_reject_reason(Some("")).is_err());
        assert!(validate_reject_reason(Some("   ")).is_err());
        assert_eq!(
            validate_reject_reason(Some("insufficient detail")).as_deref(),
            Ok("insufficient detail")
        );

        let at_limit = "理".repeat(MAX_REJECT_REASON_CHARS);
        assert!(validate_reject_reason(Some(&at_limit)).is_ok());
        let over = "a".repeat(MAX_REJECT_REASON_CHARS + 1);
        assert!(validate_reject_reason(Some(&over)).is_err());
    }

    #[test]
    fn test_title_and_attachments() {
        assert!(validate_title("").is_err());
        assert!(validate_title("科研论文").is_ok());
        assert!(validate_title(&"x".repeat(201)).is_err());

        let many: Vec<String> = (0..21).map(|i| format!("f{i}.pdf")).collect();
        assert!(validate_attachments(&many).is_err());
        assert!(validate_attachments(&many[..20]).is_ok());
        assert!(validate_attachments(&[" ".to_string()]).is_err());
    }
}
