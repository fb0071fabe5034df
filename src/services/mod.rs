pub mod booking;
pub mod clock;
pub mod flow;
pub mod session;
pub mod slots;
