//! 데이터베이스 커넥션 풀 관리.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::error::DataError;

/// 커넥션 풀 설정.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(10),
        }
    }

    /// 상시 구동 데몬용 설정. 풀을 더 크게 잡고 최소 연결을 유지한다.
    pub fn for_daemon(url: String) -> Self {
        Self {
            url,
            max_connections: 20,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// PostgreSQL 커넥션 풀 래퍼.
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DataError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await?;

        info!(
            max_connections = config.max_connections,
            "데이터베이스 연결 완료"
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// migrations/ 디렉터리의 스키마 마이그레이션 적용.
    pub async fn migrate(&self) -> Result<(), DataError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("마이그레이션 적용 완료");
        Ok(())
    }

    /// 연결 상태 확인.
    pub async fn ping(&self) -> Result<(), DataError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
