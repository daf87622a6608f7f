pub mod actor;
pub mod animation;
pub mod common;
pub mod layout_engine;
pub mod model;
pub mod sys;
