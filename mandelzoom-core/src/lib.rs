pub mod budget;
pub mod complex;
pub mod double_double;
pub mod error;
pub mod escape;
#[cfg(feature = "mpfr")]
pub mod mpfr;
pub mod scalar;
pub mod window;

// Re-export primary types for convenience.
pub use budget::IterationBudget;
pub use complex::Complex;
pub use double_double::DoubleDouble;
pub use error::CoreError;
pub use escape::EscapeTimeEngine;
pub use scalar::{Precision, Scalar};
pub use window::RenderWindow;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
