pub mod hx;

pub use hx::HxRequest;
