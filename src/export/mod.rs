//! Model persistence
//!
//! The selected pipeline (fitted preprocessor plus classifier) is written as
//! a single JSON document. Tree ensembles are stored as flat node arenas, so
//! reading an artifact never recurses per tree level.

mod artifact;

pub use artifact::{load_model, save_model};
