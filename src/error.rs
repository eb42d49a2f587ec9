//! Process-level error type.
//!
//! Every fallible operation in the pipeline returns `AppError`, which carries
//! the exit code the binary should terminate with:
//!
//! - 2: input errors (missing file, missing columns, unparseable dates)
//! - 3: empty dataset after cleaning
//! - 4: model/inference/resolution errors
//! - 5: output errors (directory creation, CSV/image writes)

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Input error: bad file, bad schema, bad values (exit code 2).
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// No usable data remains after cleaning (exit code 3).
    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    /// Model or inference failure (exit code 4).
    pub fn inference(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    /// Output-side failure: filesystem writes, image encoding (exit code 5).
    pub fn output(message: impl Into<String>) -> Self {
        Self::new(5, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
