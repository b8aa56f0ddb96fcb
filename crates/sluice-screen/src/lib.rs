//! Recipient scoring service.
//!
//! Serves `GET /check`, which turns an address into a risk score built
//! from operator lists and live chain probes. The wallet calls it
//! before every send and blocks on a high score. The service never
//! holds keys and never sees a transaction; it only reads public chain
//! state.
//!
//! One deployment can serve several networks, each probing its own
//! node. [`config::Config`] wires the deployment from `SCREEND_*`
//! environment variables.

pub mod config;
pub mod lists;
pub mod probes;
pub mod routes;
pub mod score;

pub use config::Config;
pub use lists::Lists;
pub use probes::Probes;
pub use routes::{AppState, router};
pub use score::Scorer;
