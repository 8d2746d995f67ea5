/// Returns the default DRM render node. Honors PVR_RENDER_NODE when set.
pub fn default_render_node() -> String {
    std::env::var("PVR_RENDER_NODE").unwrap_or_else(|_| "/dev/dri/renderD128".to_string())
}

/// Returns the platform name string.
pub fn platform_name() -> &'static str {
    #[cfg(target_os = "linux")]
    { "linux" }
    #[cfg(target_os = "android")]
    { "android" }
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    { "unknown" }
}
