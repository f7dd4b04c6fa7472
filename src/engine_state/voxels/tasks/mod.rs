//! # Voxel Task System
//!
//! This module contains tasks related to voxel world generation. They run on
//! the [`TaskManager`](crate::engine_state::task_management::TaskManager) worker
//! pool so that the main thread never blocks on terrain generation.

pub mod chunk_generation_task;
