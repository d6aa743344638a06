// Re-export all model types
pub use self::diagnostics::*;
pub use self::document::*;
pub use self::errors::*;
pub use self::inquiry::*;
pub use self::menu::*;
pub use self::validation::*;

mod diagnostics;
mod document;
mod errors;
mod inquiry;
mod menu;
mod validation;
