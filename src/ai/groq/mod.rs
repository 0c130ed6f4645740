pub mod client;
pub mod outline;
pub mod types;

pub use outline::GroqOutlineClient;
