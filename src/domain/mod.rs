mod history;
mod record;

pub use history::*;
pub use record::*;
