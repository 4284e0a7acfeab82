//! In-memory image store for mock runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::ports::ImageStore;

#[derive(Default)]
pub struct InMemoryImageStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn store_jpeg(&self, key: &str, bytes: Vec<u8>) -> anyhow::Result<String> {
        self.objects.write().insert(key.to_owned(), bytes);
        Ok(format!("memory://{key}"))
    }
}
