// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 结业证书
///
/// 每个选课最多一张，签发后只有过期时间可以被替换。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// 证书唯一标识符
    pub id: Uuid,
    /// 所属选课ID
    pub enrollment_id: Uuid,
    /// 证书访问地址
    pub certificate_url: String,
    /// 签发时间
    pub issued_at: DateTime<Utc>,
    /// 过期时间，为空表示永久有效
    pub expires_at: Option<DateTime<Utc>>,
}

impl Certificate {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}
