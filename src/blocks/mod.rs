//! Built-in block kinds.
//!
//! One file per kind. Each declares its static [`Profile`](crate::profile::Profile)
//! and, where the kind has interesting dynamics, a stateful tick model:
//! cache warmup (cdn), memory pressure and eviction (redis), thread and
//! connection pools (service, worker, analytics, sql_datastore), rate
//! and connection tables (api_gateway, load_balancer), page-cache and
//! segment pressure (kafka, elasticsearch), storage-engine cache
//! (docstore), partition hotspots (kv_store), and bandwidth saturation
//! (s3).

pub mod analytics;
pub mod api_gateway;
pub mod cdn;
pub mod docstore;
pub mod elasticsearch;
pub mod kafka;
pub mod kv_store;
pub mod load_balancer;
pub mod redis;
pub mod s3;
pub mod service;
pub mod sql_datastore;
pub mod user;
pub mod worker;

pub use analytics::Analytics;
pub use api_gateway::ApiGateway;
pub use cdn::Cdn;
pub use docstore::DocStore;
pub use elasticsearch::Elasticsearch;
pub use kafka::Kafka;
pub use kv_store::KvStore;
pub use load_balancer::LoadBalancer;
pub use redis::Redis;
pub use s3::S3;
pub use service::Service;
pub use sql_datastore::SqlDatastore;
pub use user::User;
pub use worker::Worker;

#[cfg(test)]
pub(crate) mod testutil {
    use crate::block::{StateMap, TickContext};

    /// Builds a tick context over `state` for one tick of traffic.
    pub fn ctx<'a>(
        reads: f64,
        writes: f64,
        raw_cap: f64,
        state: &'a mut StateMap,
    ) -> TickContext<'a> {
        TickContext {
            reads,
            writes,
            raw_cap,
            dt: 0.1,
            state,
            tick: 1,
        }
    }
}
