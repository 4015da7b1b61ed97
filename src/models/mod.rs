pub mod command;
pub mod requests;
pub mod responses;
pub mod session;

pub use command::*;
pub use requests::*;
pub use responses::*;
pub use session::*;
