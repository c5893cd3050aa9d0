//! `qs-policy` — how a lane picks the screening profile for its next
//! customer.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`context`] | `LaneTable<'a>` — read-only view of all lanes at dispatch time    |
//! | [`policy`]  | `Policy` — closed enum over the four strategies                   |
//! | [`greedy`]  | `Greedy` (P0) — per-lane running-average threshold                |
//! | [`fixed`]   | `Fixed` (P1) — one profile per lane, solved at construction       |
//! | [`group`]   | `Groups`, `Group`, `Target`, `TicketBox` — shared by P2 and P3    |
//!
//! # Contract
//!
//! [`Policy::choose_profile`] is called exactly once each time a working
//! lane is about to start screening a customer, before the service time is
//! drawn.  It returns a slot in that lane's own profile list.  Policies read
//! lanes only through the [`LaneTable`]; their own state (P3's ticket boxes)
//! changes only as a side effect of being consulted.

pub mod context;
pub mod fixed;
pub mod greedy;
pub mod group;
pub mod policy;

#[cfg(test)]
mod tests;

pub use context::LaneTable;
pub use fixed::Fixed;
pub use greedy::Greedy;
pub use group::{Group, Groups, Target, TicketBox, TICKETS_PER_BATCH};
pub use policy::Policy;
