pub mod admin;
pub mod profile;
pub mod ticket;

pub use admin::Admin;
pub use profile::{Profile, ProfileDetail};
pub use ticket::{Redemption, Ticket, TicketInfo};
