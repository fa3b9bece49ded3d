mod analysis;
mod content;
mod game;
mod response;

pub use analysis::*;
pub use content::*;
pub use game::*;
pub use response::*;
