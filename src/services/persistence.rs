//! Persistence service: startup load and background flush of dirty projects.
//!
//! DESIGN
//! ======
//! Projects live in the in-memory store. When a database is configured,
//! every row is loaded at startup and a background task drains the store's
//! dirty set on an interval, upserting each project as one JSONB row.
//!
//! ERROR HANDLING
//! ==============
//! A failed flush puts the ids back into the dirty set so the next cycle
//! retries them. Repeated upserts are acceptable, silent data loss is not.
//! Rows that no longer decode are skipped at load with a warning.

use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::project::Project;
use crate::project::store::ProjectStore;

/// Decode one stored row. `None` for data that no longer fits the model.
pub(crate) fn project_from_row(id: Uuid, data: serde_json::Value) -> Option<Project> {
    match serde_json::from_value::<Project>(data) {
        Ok(project) if project.id == id => Some(project),
        Ok(project) => {
            warn!(%id, data_id = %project.id, "persistence: row id does not match data; skipping");
            None
        }
        Err(e) => {
            warn!(%id, error = %e, "persistence: undecodable project row; skipping");
            None
        }
    }
}

/// Load every stored project.
///
/// # Errors
///
/// Returns the database error if the query fails.
pub async fn load_projects(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
    let rows: Vec<(Uuid, serde_json::Value)> = sqlx::query_as("SELECT id, data FROM projects")
        .fetch_all(pool)
        .await?;
    let projects: Vec<Project> = rows
        .into_iter()
        .filter_map(|(id, data)| project_from_row(id, data))
        .collect();
    info!(count = projects.len(), "persistence: projects loaded");
    Ok(projects)
}

/// Upsert a batch of projects in one transaction.
///
/// # Errors
///
/// Returns the database error if any statement or the commit fails.
pub async fn upsert_projects(pool: &PgPool, projects: &[Project]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for project in projects {
        let data = serde_json::to_value(project).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        sqlx::query(
            r"INSERT INTO projects (id, title, data, updated_at)
               VALUES ($1, $2, $3, to_timestamp($4::double precision / 1000.0))
               ON CONFLICT (id) DO UPDATE
               SET title = EXCLUDED.title, data = EXCLUDED.data, updated_at = EXCLUDED.updated_at",
        )
        .bind(project.id)
        .bind(&project.title)
        .bind(&data)
        .bind(project.updated_at_ms)
        .execute(tx.as_mut())
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Flush the store's dirty projects once. Returns how many were written.
pub async fn flush_dirty(store: &ProjectStore, pool: &PgPool) -> usize {
    let dirty = store.take_dirty().await;
    if dirty.is_empty() {
        return 0;
    }
    match upsert_projects(pool, &dirty).await {
        Ok(()) => dirty.len(),
        Err(e) => {
            error!(error = %e, count = dirty.len(), "persistence flush failed");
            store.mark_dirty(dirty.iter().map(|p| p.id)).await;
            0
        }
    }
}

/// Spawn the background persistence task. Returns a handle for shutdown.
pub fn spawn_persistence_task(store: ProjectStore, pool: PgPool, flush_interval_ms: u64) -> JoinHandle<()> {
    info!(flush_interval_ms, "project persistence flush configured");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(flush_interval_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            flush_dirty(&store, &pool).await;
        }
    })
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
