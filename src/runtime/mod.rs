pub mod capability;
pub mod context;
pub mod node;
pub mod registry;
pub mod response;
