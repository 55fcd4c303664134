//! Resource model: addressable values exposed to the management server.
//!
//! | Item               | Role                                        |
//! |--------------------|---------------------------------------------|
//! | [`ResourcePath`]   | `Object/Instance/Resource` triplet          |
//! | [`Methods`]        | READ / WRITE / EXECUTE permission mask      |
//! | [`ResourceRegistry`] | owner of all values, notification source  |

pub mod methods;
pub mod path;
pub mod registry;

pub use methods::Methods;
pub use path::ResourcePath;
pub use registry::{
    DeliveryStatus, ExecuteHandler, NotifyResultHandler, Resource, ResourceHandle,
    ResourceRegistry, WriteHandler, MAX_RESOURCES,
};
