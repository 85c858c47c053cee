//! Runtime entity metadata: explicit registrations resolved into entity and
//! property models, and the mapping context that holds them.

pub mod context;
pub mod entity;
pub mod kind;
pub mod property;
pub mod udt;


pub use context::{MappingContext, MappingContextBuilder};
pub use entity::{EntityDef, EntityModel, EntityRole, IdentityShape};
pub use kind::DataKind;
pub use property::{KeyRole, PropertyModel};
pub use udt::{SimpleUserTypeResolver, UserTypeResolver, UserTypeSchema};
