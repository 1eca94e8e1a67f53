//! Hook firing around wrapped git commands.
//!
//! For every hook point a cascade searches one hook folder in five stages:
//! 1. named script (`<hook-name>`)
//! 2. unnamed scripts (any other extensionless file)
//! 3. named executable (`<hook-name>.exe`)
//! 4. unnamed executables (any other `.exe`)
//! 5. shared executables from a cross-repository folder
//!
//! The first nonzero exit code stops the cascade and becomes its result.
//!
//! ## Hook folders
//!
//! - `Native`: `{cwd}/.git/hooks`. Git also runs correctly named scripts
//!   here on its own, so native hook points skip stage 1 at this location.
//! - `Versioned`: `{cwd}/hooks`, tracked with the project source.
//!
//! ## Invocation contract
//!
//! Scripts and the named executable receive the hook arguments
//! (`<command> <args...>`). Unnamed and shared executables receive
//! `<hook-name> <command> <args...>` since their file name says nothing about
//! which hook point fired them.

pub mod cascade;
pub mod hook_set;
pub mod location;

pub use cascade::{FULL_CASCADE, HookFirer, REDUCED_CASCADE, Stage};
pub use hook_set::{HookInvocation, HookSet};
pub use location::{EXECUTABLE_EXTENSION, hook_folder, is_recognized_hook_name};
