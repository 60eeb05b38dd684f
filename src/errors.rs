use thiserror::Error;

// Errors raised around assertions, never by the assertions themselves
#[derive(Debug, Error)]
pub enum AssertError {
    // The output sink rejected a failure message
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    // A test run finished after recording soft failures
    #[error("{test}: {failures} assertion(s) failed")]
    Failed { test: String, failures: usize },
}

pub type Result<T> = std::result::Result<T, AssertError>;
