use std::collections::HashMap;

use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;

use super::models::{CreateStats, UsageStats};
use crate::utils::generate_id;

/// In-memory usage statistics owned by the stats module.
#[derive(Debug, Default)]
pub struct StatsStore {
    stats: RwLock<HashMap<String, UsageStats>>,
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with three sample records.
    pub fn with_samples() -> Self {
        let now = OffsetDateTime::now_utc();
        let samples = [
            ("/api/v1/books", "GET", 200, Duration::hours(24)),
            ("/api/v1/books", "POST", 201, Duration::hours(12)),
            ("/health", "GET", 200, Duration::hours(1)),
        ];

        let stats = samples
            .into_iter()
            .map(|(endpoint, method, status, age)| {
                let record = UsageStats {
                    id: generate_id(),
                    endpoint: endpoint.to_string(),
                    method: method.to_string(),
                    status,
                    timestamp: now - age,
                };
                (record.id.clone(), record)
            })
            .collect();

        Self {
            stats: RwLock::new(stats),
        }
    }

    /// Record a sample, assigning its identifier and timestamp.
    pub async fn insert(&self, payload: CreateStats) -> UsageStats {
        let record = UsageStats {
            id: generate_id(),
            endpoint: payload.endpoint,
            method: payload.method,
            status: payload.status,
            timestamp: OffsetDateTime::now_utc(),
        };
        self.stats
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        record
    }

    pub async fn list(&self) -> Vec<UsageStats> {
        self.stats.read().await.values().cloned().collect()
    }

    pub async fn by_endpoint(&self, endpoint: &str) -> Vec<UsageStats> {
        self.stats
            .read()
            .await
            .values()
            .filter(|record| record.endpoint == endpoint)
            .cloned()
            .collect()
    }

    /// Remove every sample for `endpoint`, returning how many were removed.
    pub async fn remove_by_endpoint(&self, endpoint: &str) -> usize {
        let mut stats = self.stats.write().await;
        let before = stats.len();
        stats.retain(|_, record| record.endpoint != endpoint);
        before - stats.len()
    }

    pub async fn remove(&self, id: &str) -> Option<UsageStats> {
        self.stats.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.stats.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn samples_cover_two_endpoints() {
        let store = StatsStore::with_samples();
        assert_eq!(store.len().await, 3);
        assert_eq!(store.by_endpoint("/api/v1/books").await.len(), 2);
        assert_eq!(store.by_endpoint("/health").await.len(), 1);
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let store = StatsStore::new();
        let before = OffsetDateTime::now_utc();
        let record = store
            .insert(CreateStats {
                endpoint: "/metrics".to_string(),
                method: "GET".to_string(),
                status: 200,
            })
            .await;

        assert!(crate::utils::is_valid_id(&record.id));
        assert!(record.timestamp >= before);
        assert_eq!(store.list().await, vec![record]);
    }

    #[tokio::test]
    async fn remove_by_endpoint_only_touches_matching_records() {
        let store = StatsStore::with_samples();
        assert_eq!(store.remove_by_endpoint("/api/v1/books").await, 2);
        assert_eq!(store.remove_by_endpoint("/api/v1/books").await, 0);
        assert!(store.by_endpoint("/api/v1/books").await.is_empty());
        assert_eq!(store.len().await, 1);
    }
}
