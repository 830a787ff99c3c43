//! Landing page content: ordered list resources and singleton settings

pub mod defaults;
pub mod platform;
pub mod resources;
pub mod singletons;

pub use resources::{normalize_payload, ListResource, OrderUpdate, LIST_RESOURCES};
pub use platform::{PlatformSection, PLATFORM_STATS};
pub use singletons::{SingletonResource, SINGLETONS};
