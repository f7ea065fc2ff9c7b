//! Message-level wire structures

pub mod header;

pub use header::MessageHeader;
