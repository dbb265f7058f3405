//! The Lua helper scope.
//!
//! Every [`Build`](crate::Build) owns one Lua state. The optional `Jakefile`
//! in the root directory runs inside it and registers helpers,
//! transformations and hooks through the `jake` global table. Registrations
//! live in named registry tables of that state, so two builds never share
//! them.
//!
//! # Submodules
//!
//! - [`globals`] - The `jake` table and the registries behind it
//! - [`handle`] - The `build` userdata passed to helpers and hooks
//! - [`scope`] - Script loading, lookups, hooks and header evaluation

pub mod globals;
pub mod handle;
pub mod scope;

pub use handle::BuildHandle;
pub use scope::HelperScope;
