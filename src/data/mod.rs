/// Data layer: XDF decoding, timestamp correction and stream extraction.
///
/// Architecture:
/// ```text
///       .xdf
///        │
///        ▼
///   ┌──────────┐
///   │   xdf     │  chunks → Recording (streams in header order)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   sync    │  clock offsets, dejitter (driven by loader)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  extract  │  pupil / marker selection, rebasing → PupilSession
///   └──────────┘
/// ```
///
/// `writer` is the inverse of `xdf`, used by the sample generator.

pub mod extract;
pub mod loader;
pub mod model;
pub mod sync;
pub mod writer;
pub mod xdf;
