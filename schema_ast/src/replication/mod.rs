//! Replication vocabulary shared by the type tree and the engine's replication layout

mod layout;
mod types;

pub use layout::{HandoverRecord, RepLayoutRecord, RepLayoutRegistry, RepLayoutSource};
pub use types::{LifetimeCondition, RepLayoutCmdType, RepNotifyCondition, ReplicatedPropertyGroup, RpcType};
