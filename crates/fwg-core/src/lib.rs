//! Shared vocabulary for fishing-with-git: command kinds, hook points,
//! hook locations and the domain error type.

pub mod error;
pub mod types;

pub use error::AppError;
pub use types::{CommandKind, HookFamily, HookLocation, HookPoint, HookTiming};
