//! Result type alias for sddgen
//!
//! This module provides a convenient Result type alias that uses SddError
//! as the error type.

use super::errors::SddError;

/// Result type alias for sddgen operations
///
/// # Examples
///
/// ```
/// use sddgen::domain::result::Result;
/// use sddgen::domain::errors::SddError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SddError::Configuration("RECORDS_PER_FILE missing".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SddError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::SddError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(SddError::EmptySchedule("test".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<usize> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
