//! # Arcana Tarot Core
//!
//! Card sessions, fan choreography and daily cards for a tarot reading app.
//! Rendering and input stay with the host; this crate decides what is on
//! the table and where every card should be at any point in time.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 tarot-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Session         │  Animation               │
//! │  - Rounds        │  - Stack / fan / slot    │
//! │  - Drawn cards   │  - Timeline & timers     │
//! │  - Load / error  │  - Selection guards      │
//! ├─────────────────────────────────────────────┤
//! │  Card pools      │  Reading store           │
//! │  - Local deck    │  - Drawn cards           │
//! │  - Async seam    │  - Daily card cache      │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod card;
pub mod config;
pub mod daily;
pub mod error;
pub mod layout;
pub mod pool;
pub mod session;
pub mod stack;
pub mod store;
pub mod timeline;
pub mod transform;

pub use animation::{AnimationController, AnimationPhase, SelectionCallbacks};
pub use card::{Card, CardId, ImageRef};
pub use config::{AnimationConfig, LayoutConfig, TarotConfig};
pub use daily::DailyCardService;
pub use error::{TarotError, TarotResult};
pub use layout::{CardDimensions, SlotPosition, Viewport};
pub use pool::{CardPool, LocalCardPool, PoolError};
pub use session::{CardSession, SessionPhase, SessionState, CARDS_PER_SESSION};
pub use stack::CardStack;
pub use store::{ReadingStore, StoreError};
pub use timeline::{Animated, Easing, Tween};
pub use transform::{CardTransform, Interpolate};

/// Tarot core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
