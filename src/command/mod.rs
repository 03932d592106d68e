//! Command Module
//!
//! Parses the PUT/GET command language and runs it against the cache.

mod directive;
mod interpreter;
mod output;

pub use directive::Directive;
pub use interpreter::{Interpreter, Outcome};
pub use output::output_name;
