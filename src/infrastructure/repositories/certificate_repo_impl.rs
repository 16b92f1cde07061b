// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::certificate::Certificate;
use crate::domain::repositories::certificate_repository::CertificateRepository;
use crate::infrastructure::database::entities::certificate as certificate_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use uuid::Uuid;

/// 证书仓库实现
#[derive(Clone)]
pub struct CertificateRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl CertificateRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<certificate_entity::Model> for Certificate {
    fn from(model: certificate_entity::Model) -> Self {
        Self {
            id: model.id,
            enrollment_id: model.enrollment_id,
            certificate_url: model.certificate_url,
            issued_at: model.issued_at,
            expires_at: model.expires_at,
        }
    }
}

impl From<&Certificate> for certificate_entity::ActiveModel {
    fn from(certificate: &Certificate) -> Self {
        Self {
            id: Set(certificate.id),
            enrollment_id: Set(certificate.enrollment_id),
            certificate_url: Set(certificate.certificate_url.clone()),
            issued_at: Set(certificate.issued_at),
            expires_at: Set(certificate.expires_at),
        }
    }
}

#[async_trait]
impl CertificateRepository for CertificateRepositoryImpl {
    async fn create(&self, certificate: &Certificate) -> Result<Certificate, RepositoryError> {
        let model: certificate_entity::ActiveModel = certificate.into();
        model.insert(self.db.as_ref()).await?;
        Ok(certificate.clone())
    }

    async fn find_by_enrollment_id(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Option<Certificate>, RepositoryError> {
        let model = certificate_entity::Entity::find()
            .filter(certificate_entity::Column::EnrollmentId.eq(enrollment_id))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn update(&self, certificate: &Certificate) -> Result<Certificate, RepositoryError> {
        let model: certificate_entity::ActiveModel = certificate.into();
        let updated = model.update(self.db.as_ref()).await?;
        Ok(updated.into())
    }
}
