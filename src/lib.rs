// Air sketching: stabilized hand landmarks become gestures, gestures become
// strokes on a raster surface, and every finished stroke can be undone.
//
// The pipeline per input frame is
// `smoothing` → `gesture` → `tessellator` → `surface`, with
// `history` recording a snapshot whenever a stroke that marked the surface
// ends. `sketchpad::Sketchpad` wires the stages together.

pub mod clock;
pub mod config;
pub mod error;
pub mod gamma;
pub mod gesture;
pub mod history;
pub mod puppet;
pub mod raster;
pub mod sketchpad;
pub mod smoothing;
pub mod surface;
pub mod tessellator;
pub mod types;
pub mod window;

pub use config::Config;
pub use error::{Error, Result};
pub use gesture::GestureClassifier;
pub use history::{StrokeHistory, UndoOutcome};
pub use raster::RasterSurface;
pub use sketchpad::Sketchpad;
pub use surface::{DrawingSurface, RecordingSurface, Snapshot, StrokeStyle};
pub use types::{Gesture, InputSource, Landmark, LandmarkFrame, StrokePoint, Tool};
