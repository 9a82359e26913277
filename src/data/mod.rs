pub mod measurement;
pub mod metadata;
pub mod view;
