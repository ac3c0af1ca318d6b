//! Debug and control commands.
//!
//! Parameters arrive from the interceptor's query-derived map and from
//! prefixed cookies. Cookies win on collision. Commands are produced in the
//! fixed order show, inject, replace, debug.

pub mod resolver;
pub mod types;

pub use resolver::{cookie_value, parse_cookies, resolve_params, CommandResolver};
pub use types::{CommandKind, DebugCommand, InjectPanel, Replacement, ShowTarget};
