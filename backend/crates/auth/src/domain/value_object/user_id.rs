//! User ID Value Object
//!
//! セッショントークンの `sub` およびルートパラメータとして受け取るユーザー識別子。
//! 上位の ID 発行元（外部の認証基盤）に依存しない不透明な文字列として扱う。
//!
//! ## 不変条件
//! - 長さ: 1〜128文字
//! - 使用可能文字: `A-Z a-z 0-9 _ -`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length for a user id (in characters)
pub const USER_ID_MAX_LENGTH: usize = 128;

/// User ID validation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserIdError {
    #[error("User id must not be empty")]
    Empty,

    #[error("User id is too long ({0} characters, maximum {USER_ID_MAX_LENGTH})")]
    TooLong(usize),

    #[error("User id contains an invalid character")]
    InvalidCharacter,
}

/// Opaque user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// 検証済みのユーザー ID を生成
    pub fn new(raw: impl Into<String>) -> Result<Self, UserIdError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(UserIdError::Empty);
        }
        if raw.len() > USER_ID_MAX_LENGTH {
            return Err(UserIdError::TooLong(raw.len()));
        }
        if !raw.bytes().all(is_user_id_byte) {
            return Err(UserIdError::InvalidCharacter);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

fn is_user_id_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = UserIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
