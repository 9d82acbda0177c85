// Gateway implementations over concrete transports
pub mod rest;

pub use rest::RestGateway;
