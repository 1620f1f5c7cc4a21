use std::time::Instant;

use anyhow::Context;
use jemallocator::Jemalloc;
use log::{info, LevelFilter};
use serde::Serialize;
use simple_logger::SimpleLogger;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use goldmine::{
    store::models::{ManagerState, PoolRecord, PoolSnapshot},
    utils::{alloc_share, share_to_percent},
    EntityStore, RecordedRegistry, Reducer, ReplayWorker, Settings,
};

/// Final entity state written when `replay.dump_file` is set.
#[derive(Serialize)]
struct StateDump {
    manager: ManagerState,
    pools: Vec<PoolRecord>,
    snapshots: Vec<PoolSnapshot>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap();

    // Load configuration
    let settings = Settings::new()
        .context("Failed to load config.yaml. Please ensure it exists and is valid")?;

    let registry = RecordedRegistry::new();
    let reducer = Reducer::new(registry.clone(), settings.snapshots.interval_secs);
    let worker = ReplayWorker::new(registry, reducer);

    let mut store = EntityStore::new();

    info!("Replaying trace {}...", settings.replay.trace_file);
    let start = Instant::now();
    let stats = worker.run(&settings.replay.trace_file, &mut store).await?;

    info!(
        "Replayed {} events in {:?}: {} deposits, {} withdraws, {} pool adds, {} weight changes, {} migrations",
        stats.events,
        start.elapsed(),
        stats.deposits,
        stats.withdraws,
        stats.pool_adds,
        stats.alloc_point_sets,
        stats.migrations,
    );

    let total_alloc_point = store
        .manager()
        .map(|m| m.total_alloc_point.clone())
        .unwrap_or_default();
    info!(
        "Final state: {} pools, total alloc point {}, {} snapshot rows",
        store.pool_count(),
        total_alloc_point,
        store.snapshot_count()
    );

    let mut pools: Vec<PoolRecord> = store.pools().cloned().collect();
    pools.sort_by_key(|p| p.pid);

    for pool in &pools {
        let share = alloc_share(&pool.alloc_point, &total_alloc_point);
        info!(
            "  pool {}: balance={} alloc_point={} ({:.2}%) exchange={:?} lp={}",
            pool.pid,
            pool.balance,
            pool.alloc_point,
            share_to_percent(&share),
            pool.exchange,
            pool.lp_token
        );
    }

    if let Some(path) = &settings.replay.dump_file {
        let mut snapshots: Vec<PoolSnapshot> = store.snapshots().cloned().collect();
        snapshots.sort_by_key(|s| (s.pid, s.bucket_start));

        let dump = StateDump {
            manager: store.manager().cloned().unwrap_or_default(),
            pools,
            snapshots,
        };

        let json = serde_json::to_vec_pretty(&dump).context("failed to serialize state dump")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("failed to write state dump to {path}"))?;

        info!("State dump written to {path}");
    }

    Ok(())
}
