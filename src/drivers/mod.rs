//! Hardware drivers with host-testable cores.

pub mod button;
