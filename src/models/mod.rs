//! 数据模型定义
//!
//! 业务实体、请求与响应结构，与 `entity` 中的数据库模型分离。

pub mod achievements;
pub mod common;
pub mod notifications;
pub mod reviews;
pub mod users;

pub use common::error_code::ErrorCode;
pub use common::pagination::PaginationInfo;
pub use common::response::ApiResponse;
