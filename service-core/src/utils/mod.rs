pub mod signature;

pub use signature::secrets_match;
