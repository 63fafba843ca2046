use thiserror::Error;

/// Failures that can abort renderer setup.
///
/// All variants are fatal: setup stops before the render loop starts and the
/// error is reported to the caller. Per-frame surface errors are handled
/// separately inside the loop and never reach this type.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The host lacks a usable graphics stack (no adapter, surface, or
    /// device). The message is intended for direct display to the user.
    #[error("graphics capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// The driver rejected a shader stage; `log` carries its diagnostic.
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: &'static str, log: String },

    /// The render pipeline failed validation when the compiled stages were
    /// linked together.
    #[error("shader program failed to link: {log}")]
    Link { log: String },

    /// A user-supplied fragment shader could not be read from disk.
    #[error("failed to read shader at {path}: {source}")]
    ShaderIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
