//! HTTP handlers generated from route descriptors.

mod resource;

pub use resource::ResourceHandler;
