//! k3s node configuration rendering
//!
//! Turns a [`ClusterDescriptor`] into the configuration fragments a k3s node
//! boots with:
//!
//! - a merged option document (role defaults with provider options on top)
//! - the administrator's override document, filtered to the role's shape
//! - a proxy environment file, when the node sits behind a proxy
//!
//! [`render`] runs the whole pipeline; [`RenderedConfig::plan`] says where
//! each artifact goes. [`reset`] resolves the script that tears a node down.

pub mod descriptor;
pub mod merge;
pub mod network;
pub mod normalize;
pub mod pipeline;
pub mod plan;
pub mod proxy;
pub mod role;
pub mod schema;

pub use descriptor::{ClusterDescriptor, Role};
pub use network::{InterfaceAddr, InterfaceSource, SystemInterfaces};
pub use pipeline::{render, reset, RenderedConfig};
pub use plan::{ConfigFile, ImageImport, Plan, ResetAction, ServiceName};
pub use schema::{AgentOptions, NodeOptions, OptionSchema, ServerOptions, TriState};
