/// All of the core data structures used by the interpreter.
pub mod data_structures;

/// The primitive operations and the native words registered by the host.
pub mod built_ins;

/// Module for defining the error reporting of the interpreter.
pub mod error;

/// Module for running compiled code: the execution context, the VM and the program bootstrap.
pub mod interpreter;
