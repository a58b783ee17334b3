//! Renders untrusted email HTML safe to mount inside the host page without a
//! sandboxed frame.
//!
//! Markup-level filtering (scripts, event handlers, dangerous URLs) is done by
//! ammonia. On top of it, every sanitized document gets a fresh scope id: its
//! stylesheets are rewritten to match only inside a container carrying that
//! id, its ids and classes are renamed into the scope, disallowed CSS
//! properties are dropped, and links open in a new, reference-less context.
//!
//! ```no_run
//! use defang_lib::{Sanitizer, SanitizerConfig};
//!
//! let sanitizer = Sanitizer::new(SanitizerConfig::default())?;
//! let fragment = sanitizer.sanitize("<style>.a{color:red}</style><p class=a>hi</p>");
//! println!("{}", fragment.to_html());
//! # Ok::<(), defang_lib::ConfigError>(())
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod hooks;
pub mod parser;
pub mod sanitize;
pub mod scope;
pub mod style;

pub use config::SanitizerConfig;
pub use error::ConfigError;
pub use sanitize::{SanitizedFragment, Sanitizer};
pub use scope::{ScopeCounter, ScopeId};
