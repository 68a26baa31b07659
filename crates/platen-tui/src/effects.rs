//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime
//! executes. They represent I/O and task spawning only; the reducer
//! itself never performs I/O. Cancellation is initiated from the reducer
//! via `CancelQuery` and executed by the runtime calling
//! `token.cancel()`.

use tokio_util::sync::CancellationToken;

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Spawn the query request for a submitted user message.
    SubmitQuery {
        text: String,
        token: CancellationToken,
    },

    /// Cancel an in-flight query task.
    CancelQuery { token: CancellationToken },
}
