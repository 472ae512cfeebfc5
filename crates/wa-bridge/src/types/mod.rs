//! Types exchanged with the bridge sidecar.

mod event;
mod rpc;

pub use event::*;
pub use rpc::*;
