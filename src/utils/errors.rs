// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(DbErr),

    /// 记录未找到
    #[error("Record not found")]
    NotFound,

    /// 违反唯一约束
    #[error("Record already exists")]
    AlreadyExists,

    /// 存储中的数据无法还原为领域对象
    #[error("Corrupt record: {0}")]
    Serialization(String),
}

impl From<DbErr> for RepositoryError {
    fn from(err: DbErr) -> Self {
        if matches!(err, DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated) {
            return RepositoryError::NotFound;
        }
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => RepositoryError::AlreadyExists,
            _ => RepositoryError::Database(err),
        }
    }
}

impl RepositoryError {
    pub fn code(&self) -> &'static str {
        match self {
            RepositoryError::Database(_) => "DATABASE_ERROR",
            RepositoryError::NotFound => "NOT_FOUND",
            RepositoryError::AlreadyExists => "ALREADY_EXISTS",
            RepositoryError::Serialization(_) => "CORRUPT_RECORD",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            RepositoryError::NotFound => 404,
            RepositoryError::AlreadyExists => 409,
            _ => 500,
        }
    }
}

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("仓库错误: {0}")]
    RepositoryError(String),

    #[error("队列错误: {0}")]
    QueueError(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl WorkerError {
    pub fn code(&self) -> &'static str {
        match self {
            WorkerError::RepositoryError(_) => "WORKER_REPOSITORY_ERROR",
            WorkerError::QueueError(_) => "WORKER_QUEUE_ERROR",
            WorkerError::InternalError(_) => "WORKER_INTERNAL_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        500
    }
}
