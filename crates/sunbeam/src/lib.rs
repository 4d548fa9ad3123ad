//! Sunbeam launcher: a page stack driven by extension commands.
//!
//! ## Flow
//!
//! The root list shows one item per extension root command plus the
//! configured one-liners. Choosing an item dispatches its action; running a
//! command with a page pushes a [`Runner`] which loads the extension output
//! off the loop and renders it as a list, a detail view or a form.
//!
//! Pages describe side effects as [`page::Effect`]s. The [`Paginator`] carries
//! them out through [`page::HostOps`]: [`RuntimeHost`] in the binary, a
//! recording fake in tests.
//!
//! ## Files
//!
//! - `$XDG_CONFIG_HOME/sunbeam/sunbeam.json`: extensions and one-liners
//!   (override with `--config` or `SUNBEAM_CONFIG`).
//! - `$XDG_DATA_HOME/sunbeam/preferences.json`: saved extension preferences.
//! - `$XDG_CACHE_HOME/sunbeam/history.json`: root list recency.
//! - `$XDG_CACHE_HOME/sunbeam/sunbeam.log`: tracing output, filtered by
//!   `SUNBEAM_LOG`.

pub mod actions;
pub mod cli;
pub mod error;
pub mod form;
pub mod host;
pub mod jobs;
pub mod page;
pub mod pages;
pub mod paginator;
pub mod root;
pub mod runner;
pub mod system;
pub mod template;
pub mod views;

pub use error::LauncherError;
pub use host::{PendingHandOff, RuntimeHost};
pub use page::{AppMessage, Page, PageId};
pub use paginator::{Paginator, Registry};
pub use root::{RootPage, ROOT_TITLE};
pub use runner::{Runner, RunnerStatus};
