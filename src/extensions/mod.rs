//! Overlays layered on top of the core series.

pub mod markers;

pub use markers::{
    MarkerPosition, MarkerShape, PlacedMarker, SignalMarker, markers_from_signals, place_markers,
};
