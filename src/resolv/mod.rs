//! Resolver configuration.

pub mod conf;

pub use self::conf::ResolvConf;
