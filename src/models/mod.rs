pub mod enums;

mod chat;
mod connection;
mod diet_plan;
mod health_record;
mod pregnancy;
mod user;
mod vitals;

pub use chat::*;
pub use connection::*;
pub use diet_plan::*;
pub use health_record::*;
pub use pregnancy::*;
pub use user::*;
pub use vitals::*;
