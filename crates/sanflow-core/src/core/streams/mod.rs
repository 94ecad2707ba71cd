//! Material streams and the influents that feed a flowsheet.

pub mod composite;
pub mod error;
pub mod influent;
pub mod stream;

pub use composite::Composite;
pub use error::StreamError;
pub use influent::{PerCapitaLoads, build_influent, make_blackwater, make_greywater};
pub use stream::Stream;
