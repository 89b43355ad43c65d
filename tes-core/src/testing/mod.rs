//! Test fixtures shared by unit tests, integration tests, and benchmarks.
//!
//! - [`helpers`]: builders for `Signal`/`Order`/`SymbolRules` and a tiny
//!   sequence counter, so scenario tests don't hand-roll the same structs.
//! - [`mock_signal_feed`]: a programmable writer side of a [`crate::ring::SignalRing`],
//!   the signal-side analogue of [`crate::gateway::SimulatedExchangeClient`] on the
//!   exchange side (mirrors the teacher's mock-feed-collaborator pattern).

pub mod helpers;
pub mod mock_signal_feed;

pub use helpers::*;
pub use mock_signal_feed::MockSignalFeed;
