pub mod functions;
pub mod payload;
pub mod providers;
pub mod transports;
