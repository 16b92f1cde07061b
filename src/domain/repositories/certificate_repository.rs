// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::certificate::Certificate;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 证书仓库特质
#[async_trait]
pub trait CertificateRepository: Send + Sync {
    /// 创建证书，同一选课已有证书时返回 `AlreadyExists`
    async fn create(&self, certificate: &Certificate) -> Result<Certificate, RepositoryError>;
    /// 根据选课ID查找证书
    async fn find_by_enrollment_id(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Option<Certificate>, RepositoryError>;
    /// 更新证书
    async fn update(&self, certificate: &Certificate) -> Result<Certificate, RepositoryError>;
}
