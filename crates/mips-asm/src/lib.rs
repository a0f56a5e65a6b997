pub mod source;

pub use source::{assemble_source, parse_line, parse_num, SourceAssembler, Stmt};
