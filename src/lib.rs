//! Client-side navigation layer for bzShare.
//!
//! The [`Shell`] swaps the content of the page's mainframe region through
//! animated, busy-gated transitions, keeps a back/forward history, drives the
//! two modal dialogs and toggles breakpoint-tagged elements as the viewport
//! changes. It never performs I/O itself: [`Shell::update`] returns a [`Task`]
//! describing delays and fetches, and the host feeds completions back in as
//! [`Message`]s. [`Runtime`] is such a host for native code.

pub mod app;
pub mod binder;
pub mod config;
pub mod csrf;
pub mod dialog;
pub mod error;
pub mod fetch;
pub mod fragment;
pub mod history;
pub mod io;
pub mod logging;
pub mod message;
pub mod page;
pub mod runtime;
pub mod target;
pub mod task;
pub mod transition;
pub mod viewport;

pub use app::Shell;
pub use config::{Config, FailurePolicy, TransitionConfig};
pub use error::{ConfigError, FetchError, TargetError};
pub use fetch::{Fetcher, FetchRequest, FormField, HttpFetcher, Method, StaticFetcher};
pub use fragment::Fragment;
pub use history::HistoryStack;
pub use message::{FetchPurpose, Message, SwipeDirection};
pub use page::{Animator, DialogId, MemoryPage, Page, Region, VisualState};
pub use runtime::Runtime;
pub use target::NavigationTarget;
pub use task::Task;
pub use transition::{NavigationState, TransitionController};
pub use viewport::{classify, Breakpoint, BreakpointSet, Breakpoints};
