//! Enumerations describing how a property replicates and how an RPC is routed

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::reflection::{FunctionFlag, ReflectedFunction};

/// Wire encoding the replication layout chose for a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RepLayoutCmdType {
    /// Dynamic array header
    DynamicArray,
    /// Terminator of a dynamic array's element commands
    Return,
    /// Generic property serialized by the property itself
    Property,
    /// Bit-packed bool
    PropertyBool,
    /// 32-bit float
    PropertyFloat,
    /// 32-bit signed integer
    PropertyInt,
    /// 8-bit value
    PropertyByte,
    /// Name
    PropertyName,
    /// Object reference
    PropertyObject,
    /// 32-bit unsigned integer
    PropertyUInt32,
    /// Full precision vector
    PropertyVector,
    /// Rotator
    PropertyRotator,
    /// Plane
    PropertyPlane,
    /// Vector quantized to two decimal places
    PropertyVector100,
    /// Unique network id
    PropertyNetId,
    /// Movement replication struct
    RepMovement,
    /// Normalized vector
    PropertyVectorNormal,
    /// Vector quantized to one decimal place
    PropertyVector10,
    /// Vector quantized to integers
    PropertyVectorQ,
    /// String
    PropertyString,
    /// 64-bit unsigned integer
    PropertyUInt64,
    /// Native bool
    PropertyNativeBool,
    /// Soft object reference
    PropertySoftObject,
    /// Weak object reference
    PropertyWeakObject,
    /// Interface reference
    PropertyInterface,
    /// Struct with a native net serializer that contains object references
    NetSerializeStructWithObjectReferences,
}

/// Audience restriction attached to a replicated property
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum LifetimeCondition {
    /// No condition, replicate whenever changed
    #[default]
    #[strum(serialize = "COND_None")]
    None,
    /// Only on the initial bunch
    #[strum(serialize = "COND_InitialOnly")]
    InitialOnly,
    /// Only to the owning connection
    #[strum(serialize = "COND_OwnerOnly")]
    OwnerOnly,
    /// To everyone except the owner
    #[strum(serialize = "COND_SkipOwner")]
    SkipOwner,
    /// Only to simulated proxies
    #[strum(serialize = "COND_SimulatedOnly")]
    SimulatedOnly,
    /// Only to the autonomous proxy
    #[strum(serialize = "COND_AutonomousOnly")]
    AutonomousOnly,
    /// To simulated proxies or physics-replicated actors
    #[strum(serialize = "COND_SimulatedOrPhysics")]
    SimulatedOrPhysics,
    /// Initial bunch, or to the owner
    #[strum(serialize = "COND_InitialOrOwner")]
    InitialOrOwner,
    /// Decided at runtime by the object
    #[strum(serialize = "COND_Custom")]
    Custom,
    /// Replays or the owner
    #[strum(serialize = "COND_ReplayOrOwner")]
    ReplayOrOwner,
    /// Replays only
    #[strum(serialize = "COND_ReplayOnly")]
    ReplayOnly,
    /// Simulated proxies, excluding replays
    #[strum(serialize = "COND_SimulatedOnlyNoReplay")]
    SimulatedOnlyNoReplay,
    /// Simulated or physics, excluding replays
    #[strum(serialize = "COND_SimulatedOrPhysicsNoReplay")]
    SimulatedOrPhysicsNoReplay,
    /// Everything except replays
    #[strum(serialize = "COND_SkipReplay")]
    SkipReplay,
    /// Never replicated
    #[strum(serialize = "COND_Never")]
    Never,
}

impl LifetimeCondition {
    /// Audience group a property with this condition is replicated to
    pub const fn group(self) -> ReplicatedPropertyGroup {
        match self {
            Self::AutonomousOnly | Self::OwnerOnly => ReplicatedPropertyGroup::SingleClient,
            _ => ReplicatedPropertyGroup::MultiClient,
        }
    }
}

/// When the rep-notify callback fires
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum RepNotifyCondition {
    /// Only when the value changed
    #[default]
    #[strum(serialize = "REPNOTIFY_OnChanged")]
    OnChanged,
    /// Every time the value is received
    #[strum(serialize = "REPNOTIFY_Always")]
    Always,
}

/// Replicated properties are split by audience: those meant for a single client
/// (owner-only and autonomous-proxy-only conditions) and those meant for everyone else.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum ReplicatedPropertyGroup {
    /// Owner-restricted properties
    #[strum(serialize = "SingleClientRepData")]
    SingleClient,
    /// Broadcast properties
    #[strum(serialize = "MultiClientRepData")]
    MultiClient,
}

impl ReplicatedPropertyGroup {
    /// Every group, in schema order
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

/// Routing category of a remote procedure call
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum RpcType {
    /// Runs on the owning client
    Client,
    /// Runs on the server
    Server,
    /// Runs on another server worker
    CrossServer,
    /// Runs on the server and all clients
    NetMulticast,
    /// Network function with no recognised routing tag
    Unknown,
}

impl RpcType {
    /// RPC categories that get schema components, excluding [`RpcType::Unknown`]
    pub fn all() -> Vec<Self> {
        Self::iter().filter(|rpc_type| *rpc_type != Self::Unknown).collect()
    }

    /// Classify a function by its calling-convention tags
    pub fn from_function(function: &ReflectedFunction) -> Self {
        if function.has_flag(FunctionFlag::NetClient) {
            Self::Client
        } else if function.has_flag(FunctionFlag::NetServer) {
            Self::Server
        } else if function.has_flag(FunctionFlag::NetCrossServer) {
            Self::CrossServer
        } else if function.has_flag(FunctionFlag::NetMulticast) {
            Self::NetMulticast
        } else {
            Self::Unknown
        }
    }
}
