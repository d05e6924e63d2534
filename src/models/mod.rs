pub mod checkin;
pub mod disertante;
pub mod empresa;
pub mod programa;

pub use checkin::CheckinPayload;
pub use disertante::Disertante;
pub use empresa::Empresa;
pub use programa::{Activity, Category, ParseError, ProgramaItemWire, Room, TimeOfDay};
