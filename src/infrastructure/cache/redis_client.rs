// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use redis::{AsyncCommands, RedisResult};

/// Redis客户端
///
/// 提供投递队列与事件频道所需的异步操作
#[derive(Clone)]
pub struct RedisClient {
    /// Redis客户端
    client: redis::Client,
}

impl RedisClient {
    /// 创建新的Redis客户端实例
    ///
    /// 只解析连接地址，实际连接在首次操作时建立。
    ///
    /// # 参数
    ///
    /// * `redis_url` - Redis连接URL
    pub fn new(redis_url: &str) -> RedisResult<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    /// 将值压入列表头部
    ///
    /// # 返回值
    ///
    /// * `Ok(usize)` - 压入后列表长度
    pub async fn lpush(&self, key: &str, value: &str) -> RedisResult<usize> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.lpush(key, value).await
    }

    /// 从列表尾部弹出一个值
    ///
    /// # 返回值
    ///
    /// * `Ok(Option<String>)` - 弹出的值，列表为空时返回None
    pub async fn rpop(&self, key: &str) -> RedisResult<Option<String>> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.rpop(key, None).await
    }

    /// 向频道发布消息
    ///
    /// # 返回值
    ///
    /// * `Ok(usize)` - 收到消息的订阅者数量
    pub async fn publish(&self, channel: &str, payload: &str) -> RedisResult<usize> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.publish(channel, payload).await
    }

    /// 检查连接是否可用
    pub async fn ping(&self) -> RedisResult<()> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<()>(&mut con).await
    }
}
