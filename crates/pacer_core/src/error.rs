//!A mod for the error types
use std::fmt::Debug;

///Common error type when building components from configuration.
pub struct PacerBuildError {
    message: String,
}

impl PacerBuildError {
    pub fn from_string(message: String) -> Self {
        PacerBuildError { message }
    }
}

impl Debug for PacerBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("PacerBuildError: {}", self.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_carries_the_message() {
        let err = PacerBuildError::from_string("broker unreachable".to_string());
        assert_eq!(format!("{:?}", err), "PacerBuildError: broker unreachable");
    }
}
