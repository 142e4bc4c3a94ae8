//! 按时间过期的缓存
//!
//! 以访问器参数为键，每个访问器使用独立的过期时间。
//! 只缓存成功结果，失败不会被记住。

use moka::future::Cache;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

pub struct TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    name: &'static str,
    inner: Cache<K, V>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            inner: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// 命中直接返回，未命中时执行 `fetch` 并缓存成功结果
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.inner.get(&key).await {
            log::debug!("缓存命中: {}", self.name);
            return Ok(value);
        }

        log::debug!("缓存未命中: {}", self.name);
        let value = fetch().await?;
        self.inner.insert(key, value.clone()).await;
        Ok(value)
    }
}
