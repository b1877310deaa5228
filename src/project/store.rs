//! Project store: the single owner of live project records.
//!
//! DESIGN
//! ======
//! Handlers and services get a cloned `ProjectStore` handle. Every update
//! clones the current record, applies the change to the copy and swaps the
//! copy in, returning it to the caller. A failed update leaves the stored
//! record untouched. Concurrent updates are last-writer-wins.
//!
//! Updated ids are remembered in a dirty set that the persistence task
//! drains; see `services::persistence`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{ExpertRole, Idea, Project, ProjectStage, ProposalPatch, now_ms};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("project not found: {0}")]
    NotFound(Uuid),
}

impl crate::error::ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_PROJECT_NOT_FOUND",
        }
    }
}

#[derive(Default)]
struct StoreInner {
    projects: HashMap<Uuid, Project>,
    dirty: HashSet<Uuid>,
}

#[derive(Clone, Default)]
pub struct ProjectStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl ProjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed records loaded from the database. They are not marked dirty.
    pub async fn hydrate(&self, projects: Vec<Project>) {
        let mut inner = self.inner.write().await;
        for project in projects {
            inner.projects.insert(project.id, project);
        }
    }

    pub async fn create(&self, title: &str) -> Project {
        let project = Project::new(title);
        let mut inner = self.inner.write().await;
        inner.projects.insert(project.id, project.clone());
        inner.dirty.insert(project.id);
        info!(project_id = %project.id, "store: project created");
        project
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no project has this id.
    pub async fn get(&self, id: Uuid) -> Result<Project, StoreError> {
        let inner = self.inner.read().await;
        inner.projects.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    /// All projects, most recently updated first.
    pub async fn list(&self) -> Vec<Project> {
        let inner = self.inner.read().await;
        let mut projects: Vec<Project> = inner.projects.values().cloned().collect();
        projects.sort_by(|a, b| b.updated_at_ms.cmp(&a.updated_at_ms).then(a.title.cmp(&b.title)));
        projects
    }

    /// Apply `f` to a copy of the project and store the copy if `f` succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` (converted into `E`) for an unknown id,
    /// or whatever error `f` returns. The stored record is unchanged on error.
    pub async fn update<E, F>(&self, id: Uuid, f: F) -> Result<Project, E>
    where
        F: FnOnce(&mut Project) -> Result<(), E>,
        E: From<StoreError>,
    {
        let mut inner = self.inner.write().await;
        let mut next = inner.projects.get(&id).cloned().ok_or(StoreError::NotFound(id))?;
        f(&mut next)?;
        next.updated_at_ms = now_ms();
        inner.projects.insert(id, next.clone());
        inner.dirty.insert(id);
        Ok(next)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    pub async fn update_idea(&self, id: Uuid, idea: Idea) -> Result<Project, StoreError> {
        self.update(id, |p| {
            p.idea = Some(idea);
            if p.stage == ProjectStage::Idea {
                p.stage = ProjectStage::Proposal;
            }
            Ok(())
        })
        .await
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    pub async fn update_proposal(&self, id: Uuid, patch: ProposalPatch) -> Result<Project, StoreError> {
        self.update(id, |p| {
            patch.apply(&mut p.proposal);
            Ok(())
        })
        .await
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    pub async fn set_stage(&self, id: Uuid, stage: ProjectStage) -> Result<Project, StoreError> {
        self.update(id, |p| {
            p.stage = stage;
            Ok(())
        })
        .await
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    pub async fn assign_expert(&self, id: Uuid, role: ExpertRole, expert_id: &str) -> Result<Project, StoreError> {
        self.update(id, |p| {
            p.experts.insert(role, expert_id.to_owned());
            Ok(())
        })
        .await
    }

    /// Drain the dirty set, returning snapshots of the affected projects.
    pub async fn take_dirty(&self) -> Vec<Project> {
        let mut inner = self.inner.write().await;
        let ids: Vec<Uuid> = inner.dirty.drain().collect();
        ids.into_iter()
            .filter_map(|id| inner.projects.get(&id).cloned())
            .collect()
    }

    /// Put ids back into the dirty set after a failed flush.
    pub async fn mark_dirty(&self, ids: impl IntoIterator<Item = Uuid>) {
        let mut inner = self.inner.write().await;
        inner.dirty.extend(ids);
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
