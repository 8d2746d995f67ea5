/// A rejected ioctl, carrying the request name and the errno the kernel returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{request} failed: errno {errno}")]
pub struct IoctlError {
    pub request: &'static str,
    pub errno: i32,
}

impl IoctlError {
    pub fn new(request: &'static str, errno: i32) -> Self {
        Self { request, errno }
    }

    /// Build from the calling thread's last OS error.
    pub fn last_os_error(request: &'static str) -> Self {
        let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
        Self { request, errno }
    }
}

impl From<IoctlError> for std::io::Error {
    fn from(e: IoctlError) -> Self {
        std::io::Error::from_raw_os_error(e.errno)
    }
}
