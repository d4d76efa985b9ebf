use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: need {required} samples, got {available}")]
    InsufficientData { required: usize, available: usize },
    #[error("invalid period: {0}")]
    InvalidPeriod(u32),
}

impl IndicatorError {
    pub(crate) fn check(available: usize, required: usize) -> Result<(), Self> {
        if available < required {
            return Err(Self::InsufficientData {
                required,
                available,
            });
        }
        Ok(())
    }
}

impl From<IndicatorError> for crate::models::report::SkipReason {
    fn from(error: IndicatorError) -> Self {
        match error {
            IndicatorError::InsufficientData {
                required,
                available,
            } => Self::InsufficientData {
                required,
                available,
            },
            other => Self::InvalidData {
                detail: other.to_string(),
            },
        }
    }
}
