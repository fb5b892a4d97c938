//! Result type alias for assetlift
//!
//! This module provides a convenient Result type alias that uses LiftError
//! as the error type.

use super::errors::LiftError;

/// Result type alias for pipeline operations
///
/// # Examples
///
/// ```
/// use assetlift::domain::result::Result;
/// use assetlift::domain::errors::LiftError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(LiftError::EmptySelection)
/// }
/// ```
pub type Result<T> = std::result::Result<T, LiftError>;
