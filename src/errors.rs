//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 所有变体最终归入 [`ErrorKind`] 中六种调用方可见的错误类别。

use std::fmt;

/// 调用方可见的错误类别
///
/// 存储、序列化、配置和通知类错误对调用方统一表现为 `InternalError`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidArgument,
    ValidationError,
    Conflict,
    InternalError,
}

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - kind() 方法 - 返回调用方可见的错误类别
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_portal_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal, $kind:ident)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum PortalError {
            $($variant(String),)*
        }

        impl PortalError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(PortalError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(PortalError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误类别
            pub fn kind(&self) -> ErrorKind {
                match self {
                    $(PortalError::$variant(_) => ErrorKind::$kind,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(PortalError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl PortalError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        PortalError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_portal_errors! {
    NotFound("E001", "Resource Not Found", NotFound),
    Forbidden("E002", "Forbidden", Forbidden),
    InvalidArgument("E003", "Invalid Argument", InvalidArgument),
    Validation("E004", "Validation Error", ValidationError),
    Conflict("E005", "Conflict", Conflict),
    Internal("E006", "Internal Error", InternalError),
    DatabaseConfig("E007", "Database Configuration Error", InternalError),
    DatabaseConnection("E008", "Database Connection Error", InternalError),
    DatabaseOperation("E009", "Database Operation Error", InternalError),
    Serialization("E010", "Serialization Error", InternalError),
    Notification("E011", "Notification Error", InternalError),
}

impl PortalError {
    /// 是否可以原样重试
    ///
    /// 只有内部错误可以重试：提交是原子的，失败时不会留下部分状态。
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::InternalError
    }

    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for PortalError {}

impl From<sea_orm::DbErr> for PortalError {
    fn from(err: sea_orm::DbErr) -> Self {
        PortalError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PortalError::not_found("test").code(), "E001");
        assert_eq!(PortalError::conflict("test").code(), "E005");
        assert_eq!(PortalError::validation("test").code(), "E004");
        assert_eq!(PortalError::notification("test").code(), "E011");
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        assert_eq!(PortalError::conflict("x").kind(), ErrorKind::Conflict);
        assert_eq!(
            PortalError::validation("x").kind(),
            ErrorKind::ValidationError
        );
        assert_ne!(
            PortalError::conflict("x").kind(),
            PortalError::validation("x").kind()
        );
        assert_eq!(
            PortalError::invalid_argument("x").kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_infrastructure_errors_fold_into_internal() {
        for err in [
            PortalError::database_operation("x"),
            PortalError::database_connection("x"),
            PortalError::serialization("x"),
            PortalError::notification("x"),
        ] {
            assert_eq!(err.kind(), ErrorKind::InternalError);
            assert!(err.is_retryable());
        }
        assert!(!PortalError::conflict("x").is_retryable());
        assert!(!PortalError::not_found("x").is_retryable());
    }

    #[test]
    fn test_format_simple() {
        let err = PortalError::validation("score out of range");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("score out of range"));
    }
}
