//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the workflow rules, AI calls and persistence so route
//! handlers stay focused on protocol translation and role plumbing.

pub mod editor;
pub mod experts;
pub mod persistence;
pub mod suggestion;
pub mod transform;
pub mod workflow;
