//! 内存存储
//!
//! 基于 DashMap 的并发内存存储，按订单号保存判定结果。

use dashmap::DashMap;
use std::sync::Arc;

/// 通用内存存储
#[derive(Debug, Clone)]
pub struct MemoryStore<T> {
    data: Arc<DashMap<String, T>>,
}

impl<T: Clone> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }

    /// 插入或覆盖
    pub fn insert(&self, key: &str, value: T) {
        self.data.insert(key.to_string(), value);
    }

    /// 返回值的克隆，不持有锁
    pub fn get(&self, key: &str) -> Option<T> {
        self.data.get(key).map(|v| v.clone())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
