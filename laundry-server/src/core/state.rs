use std::sync::Arc;

use crate::core::{BoxError, Config};
use crate::db::{LaundryStore, PgStore};
use crate::orders::{Materializer, OrderLifecycle};
use crate::utils::{Clock, SystemClock};

/// 服务器状态 - 持有所有服务的共享引用
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | lifecycle | 订单状态流转 (评估、商户操作、签收、单次订单) |
/// | materializer | 订阅批次生成 |
///
/// 服务内部只持有 `Arc`，克隆成本极低。
pub struct ServerState<S: LaundryStore> {
    pub config: Config,
    pub lifecycle: OrderLifecycle<S>,
    pub materializer: Materializer<S>,
}

impl<S: LaundryStore> Clone for ServerState<S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            lifecycle: self.lifecycle.clone(),
            materializer: self.materializer.clone(),
        }
    }
}

impl<S: LaundryStore> ServerState<S> {
    /// 基于任意存储和时钟构造 (测试使用 MemoryStore + FixedClock)
    pub fn new(config: Config, store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        let lifecycle = OrderLifecycle::new(store.clone(), clock.clone(), config.order_settings());
        let materializer = Materializer::new(store, clock, config.app_key.clone());
        Self {
            config,
            lifecycle,
            materializer,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        self.lifecycle.store()
    }
}

impl ServerState<PgStore> {
    /// 初始化生产状态
    ///
    /// 1. 连接 PostgreSQL 并执行迁移
    /// 2. 使用系统时钟构造各服务
    pub async fn initialize(config: &Config) -> Result<Self, BoxError> {
        let store = PgStore::connect(&config.database_url).await?;
        tracing::info!("Database connected, migrations applied");
        Ok(Self::new(
            config.clone(),
            Arc::new(store),
            Arc::new(SystemClock),
        ))
    }
}
