//! State module for tracking mapping progress
//!
//! A container moves through `discovered → enumerated → resourced →
//! checkpointed` inside a single mapper iteration. Only a resourced container
//! may enter the checkpoint store, which keeps every flush free of
//! half-mapped containers.

mod container_state;

pub use container_state::{ContainerProgress, ContainerState};
