pub mod cache;
pub mod codec;
pub mod config;
pub mod form;
pub mod handoff;
pub mod host;
pub mod models;
pub mod pitches;
pub mod selection;
pub mod summary;
pub mod svg;
pub mod validation;
