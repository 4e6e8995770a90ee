//! Result of one failover pass over a chain's endpoints.

use crate::error::ReadError;

/// What a failover pass produced.
///
/// Keeps "an endpoint returned a (possibly zero or empty) value" apart from
/// "endpoints answered with nothing" and "no endpoint could be reached".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The first endpoint that produced a value.
    Found(T),
    /// At least one endpoint answered, none had a value.
    Empty { attempts: usize },
    /// Every endpoint failed.
    Exhausted { attempts: usize, last_error: String },
}

impl<T> Outcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Number of endpoints tried. A `Found` does not record it.
    pub fn attempts(&self) -> Option<usize> {
        match self {
            Self::Found(_) => None,
            Self::Empty { attempts } | Self::Exhausted { attempts, .. } => Some(*attempts),
        }
    }

    /// Turn the outcome into a `Result`, naming `what` was looked up on
    /// `chain` in the error.
    pub fn into_result(self, chain: &str, what: impl FnOnce() -> String) -> Result<T, ReadError> {
        match self {
            Self::Found(v) => Ok(v),
            Self::Empty { .. } => Err(ReadError::NotFound { what: what() }),
            Self::Exhausted {
                attempts,
                last_error,
            } => Err(ReadError::AllEndpointsExhausted {
                chain: chain.to_string(),
                attempts,
                last_error,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_zero_is_a_value() {
        let o = Outcome::Found(0u64);
        assert!(o.is_found());
        assert_eq!(o.into_result("eth", || "balance".into()).unwrap(), 0);
    }

    #[test]
    fn empty_and_exhausted_map_to_distinct_errors() {
        let empty: Outcome<u64> = Outcome::Empty { attempts: 2 };
        assert!(empty.into_result("eth", || "block 9".into()).unwrap_err().is_not_found());

        let down: Outcome<u64> = Outcome::Exhausted {
            attempts: 2,
            last_error: "HTTP error: refused".into(),
        };
        assert_eq!(down.attempts(), Some(2));
        assert!(down.into_result("eth", || "block 9".into()).unwrap_err().is_exhausted());
    }
}
