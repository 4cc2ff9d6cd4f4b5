//! # confkit
//!
//! A runtime configuration engine for long-running processes.
//!
//! `confkit` gathers configuration from pluggable suppliers (environment
//! variables, files, directories, REST endpoints, in-memory trees), merges
//! them by priority into one path-addressed tree, and notifies observers when
//! the value at a path changes. Suppliers backed by changing sources are
//! polled in the background, so edits to a file or a remote document are
//! picked up without a restart.
//!
//! ## Building Blocks
//!
//! - [`Partial`] - the nested, path-addressed value tree
//! - [`Value`] - a scalar, list or nested tree
//! - [`decoder`] - JSON, YAML and TOML decoders behind a [`DecoderFactory`]
//! - [`supplier`] - configuration origins, built from declarative
//!   descriptions by a [`SupplierFactory`]
//! - [`ConfigManager`] - priority merge, observers and hot reload
//! - [`trigger`] - the background timers driving reload
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use confkit::{ConfigManager, DecoderFactory, Options, Partial, SupplierFactory};
//!
//! let options = Options::default();
//! let manager = ConfigManager::new(options.clone())?;
//! let factory = SupplierFactory::with_defaults(Arc::new(DecoderFactory::default()), &options, None);
//!
//! let mut description = Partial::new();
//! description.set("type", "env")?;
//! description.set("mappings.CONFKIT_QUICKSTART_PORT", "server.port")?;
//! manager.add_supplier("env", 100, factory.create(&description)?)?;
//!
//! assert_eq!(manager.get_as_or::<u16>("server.port", 8080)?, 8080);
//! # Ok::<(), confkit::Error>(())
//! ```
//!
//! ## Merge Order
//!
//! Suppliers merge in ascending priority: a supplier with priority `10`
//! overrides one with priority `0` wherever both define a key. Nested trees
//! merge key by key; anything else is replaced wholesale.
//!
//! ## Typed Access
//!
//! Besides the typed accessors (`int`, `string`, ...), subtrees map onto
//! records either through [`Populate`] (no serde needed, keys matched
//! case-insensitively) or through serde via [`Partial::extract`]:
//!
//! ```rust,ignore
//! #[derive(Default, confkit::Populate)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! let mut server = Server::default();
//! manager.populate("server", &mut server, true)?;
//! ```
//!
//! ## Error Handling
//!
//! All errors are reported through the [`Error`] type, which integrates with
//! [`miette`] for rich terminal diagnostics; decode errors point at the
//! offending line of the document.
//!
//! ## Logging
//!
//! The engine emits [`tracing`] events (supplier registration, rebuilds,
//! reload failures) and never installs a subscriber itself.

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

// Re-export the derive macro
#[cfg(feature = "derive")]
pub use confkit_macro::Populate;

/// Re-export miette for error handling.
pub use miette;

// ============================================================================
// Core Modules
// ============================================================================

mod error;
pub use error::{Error, Result};

mod options;
pub use options::{DEFAULT_FORMAT, Options};

mod path;
pub use path::{DEFAULT_SEPARATOR, Path};

mod partial;
mod populate;
mod value;

pub use partial::Partial;
pub use populate::{FromValue, Populate, Populator};
pub use value::Value;

// ============================================================================
// Decoders and Suppliers
// ============================================================================

pub mod decoder;
pub mod supplier;

pub use decoder::{Decoder, DecoderCreator, DecoderFactory};
pub use supplier::{ObservableSupplier, Supplier, SupplierCreator, SupplierFactory};

// ============================================================================
// Manager and Hot Reload
// ============================================================================

mod manager;
pub mod trigger;

pub use manager::{Callback, ConfigManager, ObserverId};
pub use trigger::Trigger;
