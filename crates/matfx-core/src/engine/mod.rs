//! Stateful orchestration of the material effects.
//!
//! [`MaterialEffects`](effects::MaterialEffects) owns the configuration and the material
//! oracle. A propagation step runs [`limit_step`](effects::MaterialEffects::limit_step)
//! first, then advances the track, then applies [`effects`](effects::MaterialEffects::effects)
//! to the sub-steps it took.

pub mod config;
pub mod context;
pub mod effects;
pub mod error;
pub mod interface;
pub mod limits;
mod stepper;
