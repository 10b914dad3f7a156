mod random;
mod record;
mod score;
mod state;
mod status;

pub use random::*;
pub use record::*;
pub use score::*;
pub use state::*;
pub use status::*;
