use pvr_uapi::IoctlError;

/// Vulkan result codes the winsys reports to its caller.
pub mod result_code {
    pub const SUCCESS: i32 = 0;
    pub const TIMEOUT: i32 = 2;
    pub const ERROR_OUT_OF_HOST_MEMORY: i32 = -1;
    pub const ERROR_OUT_OF_DEVICE_MEMORY: i32 = -2;
    pub const ERROR_INITIALIZATION_FAILED: i32 = -3;
    pub const ERROR_UNKNOWN: i32 = -13;
}

#[derive(Debug, thiserror::Error)]
pub enum WinsysError {
    #[error("initialization failed: {0}")]
    InitializationFailed(IoctlError),

    #[error("unknown error: {0}")]
    Unknown(IoctlError),

    #[error("out of device memory: {0}")]
    OutOfDeviceMemory(IoctlError),

    #[error("out of host memory")]
    OutOfHostMemory,

    #[error("timeout")]
    Timeout,

    #[error("handle not found: {0}")]
    HandleNotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WinsysResult<T> = Result<T, WinsysError>;

impl WinsysError {
    /// The Vulkan result code this error surfaces as.
    pub fn result_code(&self) -> i32 {
        match self {
            WinsysError::InitializationFailed(_) => result_code::ERROR_INITIALIZATION_FAILED,
            WinsysError::OutOfDeviceMemory(_) => result_code::ERROR_OUT_OF_DEVICE_MEMORY,
            WinsysError::OutOfHostMemory => result_code::ERROR_OUT_OF_HOST_MEMORY,
            WinsysError::Timeout => result_code::TIMEOUT,
            WinsysError::Io(_) => result_code::ERROR_INITIALIZATION_FAILED,
            WinsysError::Unknown(_)
            | WinsysError::HandleNotFound(_)
            | WinsysError::Config(_) => result_code::ERROR_UNKNOWN,
        }
    }

    /// The errno behind a rejected kernel call, if this error came from one.
    pub fn errno(&self) -> Option<i32> {
        match self {
            WinsysError::InitializationFailed(e)
            | WinsysError::Unknown(e)
            | WinsysError::OutOfDeviceMemory(e) => Some(e.errno),
            WinsysError::Io(e) => e.raw_os_error(),
            _ => None,
        }
    }
}

/// Log a rejected kernel call and convert it into the error kind the caller expects.
///
/// The kernel's errno is kept for diagnostics, but the kind is fixed per call
/// site: callers branch on the kind, never on the errno.
pub fn ioctl_or<T>(
    result: Result<T, IoctlError>,
    kind: fn(IoctlError) -> WinsysError,
    what: &str,
) -> WinsysResult<T> {
    result.map_err(|e| {
        tracing::error!(request = e.request, errno = e.errno, "{}", what);
        kind(e)
    })
}
