// Business logic services layer
//
// Services built on top of the transform key catalog and the keyterms API
// client, shared by every command.

pub mod reference;
pub mod transform;

pub use reference::{ReferenceBackend, ReferenceService};
pub use transform::{Selection, SelectionError, TransformBackend, TransformService};
