/*!
 * Role Store
 * In-process persistence stand-in used by the binary and tests
 */

mod invites;
mod memory;

pub use invites::{Invite, InviteCode};
pub use memory::{MemoryRoleStore, SeedDocument};
