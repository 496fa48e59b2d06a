//! TrackVis (`.trk`) export and import of fiber bundles.

pub mod header;
pub mod reader;
pub mod reference;
pub mod writer;

pub use header::TrkHeader;
pub use reader::{load_trk, read_trk, TrkFile};
pub use reference::{CoordinateSystem, TrkReference};
pub use writer::{save_trk, write_trk};
