//! Input and output formats at the edge of the binary.

pub mod csv;
