// CONTROLLER: input, movement, proximity and the per-frame update
pub mod camera_controller;
pub mod frame_loop;
pub mod hover;
pub mod input;
pub mod loader;
pub mod movement;
pub mod proximity;
pub mod tween;

pub use camera_controller::{CameraController, OrbitRig};
pub use frame_loop::{FrameLoopContext, FrameView, HudInfo, SceneRenderer};
pub use hover::{HoverEdge, HoverHighlight};
pub use input::{InputEvent, InputState, KeyBindings};
pub use loader::{load_slot, AssetLoader, LoadSlot, LoadedAsset, SlotPublisher};
pub use movement::{MovementController, MovementMode};
pub use tween::{Ease, Tween};
