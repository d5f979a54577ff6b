/// Module for tracking positions within the original source code.
#[macro_use]
pub mod source_buffer;

/// Module for turning the source code into a list of tokens for further processing.
pub mod tokenizing;

/// Module for defining the byte-code instructions of the virtual machine.
pub mod code;

/// Module for compiling that list of tokens into a list of byte-code instructions.  Word
/// definitions and conditionals are compiled recursively from the spans of tokens they enclose.
pub mod compilation;
