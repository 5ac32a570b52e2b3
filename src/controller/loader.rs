//! Asynchronous asset hand-off.
//!
//! A loader publishes its result exactly once through a [`SlotPublisher`]; the frame loop
//! polls the matching [`LoadSlot`] every frame and must treat "not yet loaded" as normal.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::LoadError;

/// Scheme for assets generated in memory instead of fetched
pub const BUILTIN_SCHEME: &str = "builtin:";

#[derive(Debug)]
enum SlotState<T> {
    Pending,
    Ready(T),
    Taken,
    Failed(LoadError),
}

/// Consumer side of a publish-once hand-off
#[derive(Debug)]
pub struct LoadSlot<T> {
    state: Rc<RefCell<SlotState<T>>>,
}

/// Producer side. Publishing consumes it, so a slot can only be filled once.
#[derive(Debug)]
pub struct SlotPublisher<T> {
    state: Rc<RefCell<SlotState<T>>>,
}

/// Create a connected publisher/slot pair
pub fn load_slot<T>() -> (SlotPublisher<T>, LoadSlot<T>) {
    let state = Rc::new(RefCell::new(SlotState::Pending));
    (SlotPublisher { state: state.clone() }, LoadSlot { state })
}

impl<T> SlotPublisher<T> {
    pub fn publish(self, result: Result<T, LoadError>) {
        let next = match result {
            Ok(value) => SlotState::Ready(value),
            Err(err) => {
                tracing::error!(error = %err, "asset load failed");
                SlotState::Failed(err)
            }
        };
        *self.state.borrow_mut() = next;
    }
}

impl<T> LoadSlot<T> {
    /// Take the value if it has arrived. Yields `Some` at most once.
    pub fn poll(&self) -> Option<T> {
        let mut state = self.state.borrow_mut();
        if !matches!(*state, SlotState::Ready(_)) {
            return None;
        }
        match std::mem::replace(&mut *state, SlotState::Taken) {
            SlotState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.state.borrow(), SlotState::Pending)
    }

    pub fn error(&self) -> Option<LoadError> {
        match &*self.state.borrow() {
            SlotState::Failed(err) => Some(err.clone()),
            _ => None,
        }
    }
}

/// Bytes received so far; `total` is unknown when the source does not report a size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl LoadProgress {
    pub fn percent(&self) -> Option<f32> {
        match self.total {
            Some(0) | None => None,
            Some(total) => Some((self.loaded as f64 / total as f64 * 100.0) as f32),
        }
    }
}

pub type ProgressFn = Box<dyn FnMut(LoadProgress)>;

/// Progress callback that only logs
pub fn log_progress(path: &str) -> ProgressFn {
    let path = path.to_string();
    Box::new(move |progress: LoadProgress| match progress.percent() {
        Some(pct) => tracing::info!(path = %path, "{pct:.0}% loaded"),
        None => tracing::info!(path = %path, loaded = progress.loaded, "bytes loaded"),
    })
}

/// A model payload that parsed as glTF. The scene still draws a proxy body for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedAsset {
    pub path: String,
    pub bytes: Vec<u8>,
    pub meshes: usize,
}

impl LoadedAsset {
    fn builtin(path: &str) -> Self {
        Self {
            path: path.to_string(),
            bytes: path.as_bytes().to_vec(),
            meshes: 1,
        }
    }

    /// Validate `bytes` as a glTF or GLB document
    pub fn decode(path: &str, bytes: Vec<u8>) -> Result<Self, LoadError> {
        if bytes.is_empty() {
            return Err(LoadError::Empty { path: path.to_string() });
        }
        let gltf = gltf::Gltf::from_slice(&bytes).map_err(|e| LoadError::decode(path, &e))?;
        let meshes = gltf.meshes().count();
        tracing::debug!(path, meshes, "decoded glTF document");
        Ok(Self {
            path: path.to_string(),
            bytes,
            meshes,
        })
    }
}

pub trait AssetLoader {
    /// Start loading `path`. The result arrives through `publisher`, possibly later.
    fn load(&self, path: &str, progress: ProgressFn, publisher: SlotPublisher<LoadedAsset>);
}

/// Handles the `builtin:` scheme; returns the publisher back for any other path
fn load_builtin(
    path: &str,
    progress: &mut ProgressFn,
    publisher: SlotPublisher<LoadedAsset>,
) -> Option<SlotPublisher<LoadedAsset>> {
    if !path.starts_with(BUILTIN_SCHEME) {
        return Some(publisher);
    }
    let asset = LoadedAsset::builtin(path);
    let size = asset.bytes.len() as u64;
    progress(LoadProgress { loaded: size, total: Some(size) });
    publisher.publish(Ok(asset));
    None
}

/// Reads a local file in chunks, reporting progress after each
#[cfg(not(target_arch = "wasm32"))]
pub struct FileLoader {
    pub chunk_size: usize,
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for FileLoader {
    fn default() -> Self {
        Self { chunk_size: 64 * 1024 }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl FileLoader {
    fn read(&self, path: &str, progress: &mut ProgressFn) -> Result<LoadedAsset, LoadError> {
        use std::io::Read;

        let mut file = std::fs::File::open(path).map_err(|e| LoadError::io(path, &e))?;
        let total = file.metadata().map(|m| m.len()).ok();
        let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
        let mut chunk = vec![0u8; self.chunk_size.max(1)];
        loop {
            let n = file.read(&mut chunk).map_err(|e| LoadError::io(path, &e))?;
            if n == 0 {
                break;
            }
            bytes.extend_from_slice(&chunk[..n]);
            progress(LoadProgress { loaded: bytes.len() as u64, total });
        }
        LoadedAsset::decode(path, bytes)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AssetLoader for FileLoader {
    fn load(&self, path: &str, mut progress: ProgressFn, publisher: SlotPublisher<LoadedAsset>) {
        let Some(publisher) = load_builtin(path, &mut progress, publisher) else {
            return;
        };
        publisher.publish(self.read(path, &mut progress));
    }
}

/// Fetches over HTTP from the page origin
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct FetchLoader;

#[cfg(target_arch = "wasm32")]
fn fetch_error(url: &str, err: wasm_bindgen::JsValue) -> LoadError {
    LoadError::Fetch {
        url: url.to_string(),
        message: format!("{err:?}"),
    }
}

#[cfg(target_arch = "wasm32")]
impl FetchLoader {
    async fn fetch(url: String, mut progress: ProgressFn) -> Result<LoadedAsset, LoadError> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;

        let window = web_sys::window().ok_or_else(|| LoadError::Fetch {
            url: url.clone(),
            message: "no global `window`".to_string(),
        })?;
        let response: web_sys::Response = JsFuture::from(window.fetch_with_str(&url))
            .await
            .map_err(|e| fetch_error(&url, e))?
            .dyn_into()
            .map_err(|e| fetch_error(&url, e))?;
        if !response.ok() {
            return Err(LoadError::Http { url, status: response.status() });
        }

        let total = response
            .headers()
            .get("content-length")
            .ok()
            .flatten()
            .and_then(|len| len.parse::<u64>().ok());
        let buffer = JsFuture::from(response.array_buffer().map_err(|e| fetch_error(&url, e))?)
            .await
            .map_err(|e| fetch_error(&url, e))?;
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
        progress(LoadProgress { loaded: bytes.len() as u64, total: total.or(Some(bytes.len() as u64)) });

        LoadedAsset::decode(&url, bytes)
    }
}

#[cfg(target_arch = "wasm32")]
impl AssetLoader for FetchLoader {
    fn load(&self, path: &str, mut progress: ProgressFn, publisher: SlotPublisher<LoadedAsset>) {
        let Some(publisher) = load_builtin(path, &mut progress, publisher) else {
            return;
        };
        let url = path.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            publisher.publish(Self::fetch(url, progress).await);
        });
    }
}
