//! The traffic source.
//!
//! `user` nodes inject load and consume no resources; the engine treats
//! them (and any unregistered kind) as infinite passthrough.

use crate::block::Block;
use crate::profile::Profile;

/// The user/source kind.
pub struct User;

impl Block for User {
    fn kind(&self) -> &'static str {
        "user"
    }

    fn display_name(&self) -> &'static str {
        "User"
    }

    fn profile(&self) -> Profile {
        Profile::default()
    }
}
