//! Template engine: bindings, conditional blocks and functions
//!
//! A [`Template`] owns its text, the values bound to variable names, the set
//! of enabled conditions and a registry of functions. Rendering walks the
//! scanned text once, resolving each placeholder in turn.
//!
//! # Example
//!
//! ```text
//! ${<logged-in>}
//!   ${tr:welcome} ${user-name}
//! ${</logged-in>}
//! ${block:form-field email}
//! ```

mod functions;
mod registry;
mod resolver;

pub use functions::substitute_positional;
pub use registry::{CustomFunction, Function, FunctionRegistry};
pub use resolver::{Rendered, Template};
