//! Error types for asset loading and GPU setup.

use std::fmt;

/// Errors reported by an [`AssetLoader`](crate::controller::loader::AssetLoader).
///
/// A load failure is never fatal: it is logged and the vehicle stays absent.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Reading a local file failed.
    Io {
        /// Path that could not be read.
        path: String,
        /// The underlying error message.
        message: String,
    },
    /// The server answered with a non-success status.
    Http {
        /// The requested URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
    /// The fetch itself failed (network error, rejected promise, bad body).
    Fetch {
        /// The requested URL.
        url: String,
        /// The error message reported by the browser.
        message: String,
    },
    /// The resource was found but contained no data.
    Empty {
        /// Path or URL of the empty resource.
        path: String,
    },
    /// The payload is not a readable glTF document.
    Decode {
        /// Path or URL of the payload.
        path: String,
        /// The decoder's error message.
        message: String,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, message } => write!(f, "failed to read {path}: {message}"),
            LoadError::Http { url, status } => {
                write!(f, "request to {url} returned status {status}")
            }
            LoadError::Fetch { url, message } => write!(f, "fetch of {url} failed: {message}"),
            LoadError::Empty { path } => write!(f, "{path} is empty"),
            LoadError::Decode { path, message } => write!(f, "{path} is not a valid glTF model: {message}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl LoadError {
    pub fn io(path: &str, err: &std::io::Error) -> Self {
        LoadError::Io {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub fn decode(path: &str, err: &gltf::Error) -> Self {
        LoadError::Decode {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

/// Failures while bringing up the GPU. Unlike [`LoadError`] these abort startup.
#[derive(Debug)]
pub enum GpuError {
    Surface(wgpu::CreateSurfaceError),
    Adapter(wgpu::RequestAdapterError),
    Device(wgpu::RequestDeviceError),
    /// The surface reports no usable texture format for this adapter.
    Unsupported,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::Surface(e) => write!(f, "failed to create surface: {e}"),
            GpuError::Adapter(e) => write!(f, "no suitable GPU adapter: {e}"),
            GpuError::Device(e) => write!(f, "failed to request device: {e}"),
            GpuError::Unsupported => write!(f, "surface is not supported by the adapter"),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::Surface(e) => Some(e),
            GpuError::Adapter(e) => Some(e),
            GpuError::Device(e) => Some(e),
            GpuError::Unsupported => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::Surface(e)
    }
}

impl From<wgpu::RequestAdapterError> for GpuError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        GpuError::Adapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::Device(e)
    }
}
