#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Sequence catalog built from the dataset annotation files.
pub mod catalog;

/// Dataset facade combining the catalog, file I/O and the geometric pipeline.
pub mod dataset;

/// Error types for the catalog and the dataset facade.
pub mod error;

/// Drawing of projected data onto camera images.
pub mod overlay;

/// Serde model of the sequence annotation files.
pub mod schema;

/// Dataset splits and their membership lists.
pub mod split;

pub use crate::catalog::{FrameRecord, Sequence, SequenceCatalog};
pub use crate::dataset::OnceDataset;
pub use crate::error::{CatalogError, DatasetError};
pub use crate::split::Split;

#[doc(inline)]
pub use oncekit_image as image;

#[doc(inline)]
pub use oncekit_imgproc as imgproc;

#[doc(inline)]
pub use oncekit_io as io;

#[doc(inline)]
pub use oncekit_3d as k3d;
