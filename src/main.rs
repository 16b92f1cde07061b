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

use anyhow::Context;
use learnhub::config::settings::{ProviderSettings, Settings};
use learnhub::domain::models::notification::NotificationType;
use learnhub::domain::repositories::notification_repository::NotificationRepository;
use learnhub::domain::services::event_publisher::EventPublisher;
use learnhub::domain::services::notification_sender::NotificationSender;
use learnhub::infrastructure::cache::redis_client::RedisClient;
use learnhub::infrastructure::database::connection;
use learnhub::infrastructure::events::broadcast_event_publisher::BroadcastEventPublisher;
use learnhub::infrastructure::events::redis_event_publisher::RedisEventPublisher;
use learnhub::infrastructure::repositories::notification_repo_impl::NotificationRepositoryImpl;
use learnhub::infrastructure::senders::channel_router::ChannelSenderRouter;
use learnhub::infrastructure::senders::email_sender::EmailSender;
use learnhub::infrastructure::senders::http_provider::HttpProviderClient;
use learnhub::infrastructure::senders::push_sender::PushSender;
use learnhub::infrastructure::senders::sms_sender::SmsSender;
use learnhub::queue::notification_queue::{InMemoryNotificationQueue, NotificationQueue};
use learnhub::queue::redis_queue::RedisNotificationQueue;
use learnhub::utils::retry_policy::RetryPolicy;
use learnhub::utils::telemetry;
use learnhub::workers::delivery_dispatcher::{DeliveryDispatcher, DispatcherConfig};
use learnhub::workers::manager::WorkerManager;
use learnhub::workers::queue_consumer::QueueConsumerWorker;
use learnhub::workers::sweep_worker::DispatchSweepWorker;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动投递工作器
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting learnhub notification dispatcher...");

    // 2. Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    info!("Configuration loaded");

    if settings.metrics.enabled {
        let addr: SocketAddr = settings
            .metrics
            .listen_addr
            .parse()
            .context("invalid metrics.listen_addr")?;
        if let Err(e) = learnhub::infrastructure::metrics::init_metrics(addr) {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    }

    // 3. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    if settings.database.run_migrations {
        connection::run_migrations(db.as_ref()).await?;
    }

    // 4. Build collaborators
    let redis = RedisClient::new(&settings.redis.url)?;
    let repository: Arc<dyn NotificationRepository> =
        Arc::new(NotificationRepositoryImpl::new(db.clone()));
    let queue = build_queue(&settings, &redis);
    let publisher = build_publisher(&settings, &redis);
    let sender = build_sender(&settings)?;

    // 5. Start workers
    let dispatcher = Arc::new(DeliveryDispatcher::new(
        repository.clone(),
        sender,
        publisher,
        DispatcherConfig::from(&settings.dispatcher),
    ));

    let mut manager = WorkerManager::new(
        RetryPolicy::with_max_retries(settings.workers.max_restarts),
        Duration::from_secs(settings.workers.drain_timeout_secs),
    );
    manager.register(Arc::new(QueueConsumerWorker::new(
        queue,
        dispatcher.clone(),
        settings.queue.block_timeout(),
    )));
    manager.register(Arc::new(DispatchSweepWorker::new(
        repository,
        dispatcher,
        settings.dispatcher.poll_interval(),
        settings.dispatcher.claim_timeout(),
        settings.dispatcher.default_batch_size,
    )));
    manager.start();

    manager.wait_for_shutdown().await;
    info!("learnhub stopped");
    Ok(())
}

fn build_queue(settings: &Settings, redis: &RedisClient) -> Arc<dyn NotificationQueue> {
    match settings.queue.backend.as_str() {
        "memory" => {
            info!("Using in-process delivery queue");
            Arc::new(InMemoryNotificationQueue::new())
        }
        backend => {
            if backend != "redis" {
                warn!("Unknown queue backend '{}', falling back to redis", backend);
            }
            Arc::new(RedisNotificationQueue::new(
                redis.clone(),
                settings.queue.key.clone(),
                settings.queue.poll_interval(),
            ))
        }
    }
}

fn build_publisher(settings: &Settings, redis: &RedisClient) -> Arc<dyn EventPublisher> {
    match settings.events.backend.as_str() {
        "broadcast" => Arc::new(BroadcastEventPublisher::new(settings.events.capacity)),
        backend => {
            if backend != "redis" {
                warn!("Unknown events backend '{}', falling back to redis", backend);
            }
            Arc::new(RedisEventPublisher::new(
                redis.clone(),
                settings.events.channel.clone(),
            ))
        }
    }
}

fn build_sender(settings: &Settings) -> anyhow::Result<Arc<dyn NotificationSender>> {
    let client = HttpProviderClient::new(Duration::from_secs(
        settings.senders.request_timeout_secs,
    ))?;
    let mut router = ChannelSenderRouter::new();

    let enabled = |p: &ProviderSettings| p.enabled.then(|| (p.endpoint.clone(), p.api_key.clone()));

    if let Some((endpoint, key)) = enabled(&settings.senders.email) {
        router = router.register(
            NotificationType::Email,
            Arc::new(EmailSender::new(client.clone(), endpoint, key)),
        );
    }
    if let Some((endpoint, key)) = enabled(&settings.senders.sms) {
        router = router.register(
            NotificationType::Sms,
            Arc::new(SmsSender::new(client.clone(), endpoint, key)),
        );
    }
    if let Some((endpoint, key)) = enabled(&settings.senders.push) {
        router = router.register(
            NotificationType::Push,
            Arc::new(PushSender::new(client, endpoint, key)),
        );
    }

    Ok(Arc::new(router))
}
