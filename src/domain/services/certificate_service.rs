// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::certificate::Certificate;
use crate::domain::repositories::certificate_repository::CertificateRepository;
use crate::domain::repositories::enrollment_repository::EnrollmentRepository;
use crate::domain::services::progress_service::{ProgressError, ProgressService};
use crate::utils::errors::RepositoryError;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// 证书服务错误
#[derive(Error, Debug)]
pub enum CertificateError {
    /// 选课或证书不存在
    #[error("Not found: {0}")]
    NotFound(String),

    /// 课程尚未完成
    #[error("Course not completed: progress is {progress}%")]
    IncompleteCourse { progress: f64 },

    /// 该选课已有证书
    #[error("Certificate already issued for enrollment {0}")]
    DuplicateCertificate(Uuid),

    /// 进度计算失败
    #[error("Progress error: {0}")]
    Progress(#[from] ProgressError),

    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl CertificateError {
    pub fn code(&self) -> &'static str {
        match self {
            CertificateError::NotFound(_) => "NOT_FOUND",
            CertificateError::IncompleteCourse { .. } => "INCOMPLETE_COURSE",
            CertificateError::DuplicateCertificate(_) => "DUPLICATE_CERTIFICATE",
            CertificateError::Progress(e) => e.code(),
            CertificateError::Repository(e) => e.code(),
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            CertificateError::NotFound(_) => 404,
            CertificateError::IncompleteCourse { .. } => 409,
            CertificateError::DuplicateCertificate(_) => 409,
            CertificateError::Progress(e) => e.http_status(),
            CertificateError::Repository(e) => e.http_status(),
        }
    }
}

/// 证书地址生成器
///
/// 证书渲染的扩展点，返回可访问证书的地址
pub trait CertificateUrlGenerator: Send + Sync {
    fn generate(&self, certificate_id: Uuid, enrollment_id: Uuid) -> String;
}

/// 默认地址生成器，格式为 `{base_url}/certificates/{certificate_id}`
pub struct PlaceholderUrlGenerator {
    base_url: String,
}

impl PlaceholderUrlGenerator {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl CertificateUrlGenerator for PlaceholderUrlGenerator {
    fn generate(&self, certificate_id: Uuid, _enrollment_id: Uuid) -> String {
        format!("{}/certificates/{}", self.base_url, certificate_id)
    }
}

/// 证书服务
pub struct CertificateService {
    enrollment_repo: Arc<dyn EnrollmentRepository>,
    certificate_repo: Arc<dyn CertificateRepository>,
    progress_service: Arc<ProgressService>,
    url_generator: Arc<dyn CertificateUrlGenerator>,
    validity: Option<Duration>,
}

impl CertificateService {
    /// 创建新的证书服务实例
    ///
    /// # 参数
    ///
    /// * `validity_days` - 证书有效天数，为空表示永久有效
    pub fn new(
        enrollment_repo: Arc<dyn EnrollmentRepository>,
        certificate_repo: Arc<dyn CertificateRepository>,
        progress_service: Arc<ProgressService>,
        url_generator: Arc<dyn CertificateUrlGenerator>,
        validity_days: Option<i64>,
    ) -> Self {
        Self {
            enrollment_repo,
            certificate_repo,
            progress_service,
            url_generator,
            validity: validity_days.map(Duration::days),
        }
    }

    /// 为已完成的选课签发证书
    ///
    /// # 参数
    ///
    /// * `enrollment_id` - 选课ID
    ///
    /// # 返回值
    ///
    /// * `Ok(Certificate)` - 新签发的证书
    /// * `Err(CertificateError::NotFound)` - 选课不存在
    /// * `Err(CertificateError::IncompleteCourse)` - 进度不足 100%
    /// * `Err(CertificateError::DuplicateCertificate)` - 已签发过证书
    pub async fn issue_certificate(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Certificate, CertificateError> {
        if self.enrollment_repo.find_by_id(enrollment_id).await?.is_none() {
            return Err(CertificateError::NotFound(format!(
                "enrollment {}",
                enrollment_id
            )));
        }

        let progress = self.progress_service.get_progress(enrollment_id).await?;
        if !progress.is_complete() {
            return Err(CertificateError::IncompleteCourse {
                progress: progress.progress_percentage,
            });
        }

        if self
            .certificate_repo
            .find_by_enrollment_id(enrollment_id)
            .await?
            .is_some()
        {
            return Err(CertificateError::DuplicateCertificate(enrollment_id));
        }

        let id = Uuid::new_v4();
        let issued_at = Utc::now();
        let certificate = Certificate {
            id,
            enrollment_id,
            certificate_url: self.url_generator.generate(id, enrollment_id),
            issued_at,
            expires_at: self.validity.map(|v| issued_at + v),
        };

        match self.certificate_repo.create(&certificate).await {
            Ok(created) => {
                info!(%enrollment_id, certificate_id = %created.id, "Certificate issued");
                Ok(created)
            }
            Err(RepositoryError::AlreadyExists) => {
                warn!(%enrollment_id, "Concurrent certificate issuance rejected by unique index");
                Err(CertificateError::DuplicateCertificate(enrollment_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 查询选课的证书
    pub async fn get_certificate(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Certificate, CertificateError> {
        self.certificate_repo
            .find_by_enrollment_id(enrollment_id)
            .await?
            .ok_or_else(|| {
                CertificateError::NotFound(format!("certificate for enrollment {}", enrollment_id))
            })
    }

    /// 替换证书的过期时间
    pub async fn supersede_expiry(
        &self,
        enrollment_id: Uuid,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Certificate, CertificateError> {
        let mut certificate = self.get_certificate(enrollment_id).await?;
        certificate.expires_at = expires_at;
        let updated = self.certificate_repo.update(&certificate).await?;
        info!(%enrollment_id, expires_at = ?updated.expires_at, "Certificate expiry superseded");
        Ok(updated)
    }
}
