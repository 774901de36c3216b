//! Domain state types.
//!
//! - `profile`: connection profiles, devices, active connections and categories
//! - `switch`: toggle records derived from profiles

mod profile;
mod switch;

pub use profile::{
    ActiveConnection, ActiveDevice, ConnectionCategory, ConnectionProfile, ProfileKey,
};
pub use switch::SwitchEntry;
