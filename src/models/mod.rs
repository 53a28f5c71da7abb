pub mod card;
pub mod options;
pub mod page;
pub mod printing;

pub use card::*;
pub use options::*;
pub use page::*;
pub use printing::*;
