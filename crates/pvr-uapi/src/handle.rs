use serde::{Deserialize, Serialize};

macro_rules! kernel_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// The zero handle, never handed out by the kernel.
            pub const fn null() -> Self {
                Self(0)
            }

            pub const fn is_null(&self) -> bool {
                self.0 == 0
            }

            pub const fn raw(&self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

kernel_handle!(
    /// Handle of a firmware context created with CREATE_CONTEXT.
    ContextHandle
);

kernel_handle!(
    /// Handle of a GPU virtual-memory context created with CREATE_VM_CONTEXT.
    VmContextHandle
);

kernel_handle!(
    /// Handle of a DRM sync object. Opaque to userspace -- the kernel assigns these.
    SyncObjHandle
);
