// MODEL: Scene data and camera
pub mod camera;
pub mod ray;
pub mod scene;
pub mod transform;

pub use camera::Camera;
pub use ray::Ray;
pub use scene::{InfoPanel, Lighting, Material, MeshKind, PointOfInterest, Prop, Scene, SceneObject};
pub use transform::Transform;
