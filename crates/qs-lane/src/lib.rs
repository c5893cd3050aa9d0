//! `qs-lane` — one screening lane and the protocol lanes use to relieve
//! broken neighbours.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`customer`] | `Customer`, `Service` — one arrival and its screening record   |
//! | [`lane`]     | `Lane`, `ArrivalSource`, `LaneCounters` — the event machine    |
//! | [`relief`]   | `borrow_from_neighbors`, `lanes_to_help`, `search_order`       |
//!
//! # Event handling
//!
//! A lane never advances time on its own.  The simulator calls, per tick and
//! in this order over all lanes:
//!
//! 1. [`Lane::handle_arrival`]: fold a due arrival into the queue.
//! 2. [`Lane::handle_completion`]: finish a due screening.
//! 3. [`relief::borrow_from_neighbors`] followed by a policy decision and
//!    [`Lane::start_service`]: put an idle screener to work.
//!
//! [`Lane::next_activity_time`] tells the simulator how far it may jump.

pub mod customer;
pub mod lane;
pub mod relief;


pub use customer::{Customer, Service};
pub use lane::{ArrivalSource, Lane, LaneCounters, OWN_BETWEEN_BORROWS};
pub use relief::{borrow_from_neighbors, lanes_to_help, search_order};
