//! Loads applied to spring elements

mod element_load;

pub use element_load::ElementLoad;
