//! Error Kind
//!
//! The closed set of failure classes the security pipeline can answer with.

use serde::Serialize;

/// エラー種別
///
/// パイプラインの各段（CSRF・レート制限・セッション・監査）が返す失敗の分類。
/// 503 は「判定できなかった」ことを表し、常に拒否側に倒します。
///
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// assert_eq!(ErrorKind::TooManyRequests.status_code(), 429);
/// assert!(ErrorKind::ServiceUnavailable.is_server_error());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 不正なパラメータ
    BadRequest,
    /// セッションなし
    Unauthorized,
    /// CSRF 失敗・権限不足
    Forbidden,
    /// 対象ユーザーが存在しない、または削除済み
    NotFound,
    /// スライディングウィンドウ満杯
    TooManyRequests,
    InternalServerError,
    /// ストア障害・未設定
    ServiceUnavailable,
}

impl ErrorKind {
    pub const fn status_code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::TooManyRequests => 429,
            Self::InternalServerError => 500,
            Self::ServiceUnavailable => 503,
        }
    }

    /// 5xx はエラーログの対象
    pub const fn is_server_error(self) -> bool {
        matches!(self, Self::InternalServerError | Self::ServiceUnavailable)
    }

    /// `axum` のステータス型へ変換
    #[cfg(feature = "axum")]
    pub fn http_status(self) -> http::StatusCode {
        match self {
            Self::BadRequest => http::StatusCode::BAD_REQUEST,
            Self::Unauthorized => http::StatusCode::UNAUTHORIZED,
            Self::Forbidden => http::StatusCode::FORBIDDEN,
            Self::NotFound => http::StatusCode::NOT_FOUND,
            Self::TooManyRequests => http::StatusCode::TOO_MANY_REQUESTS,
            Self::InternalServerError => http::StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => http::StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::TooManyRequests => "too_many_requests",
            Self::InternalServerError => "internal_server_error",
            Self::ServiceUnavailable => "service_unavailable",
        };
        f.write_str(label)
    }
}
