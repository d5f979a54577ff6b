/// Module for the managing source code and the generation of byte code.
#[macro_use]
pub mod lang;

/// Module for the runtime and the data structures used by the interpreter.  As well as the
/// interpreter itself.
#[macro_use]
pub mod runtime;

pub use runtime::{
    data_structures::{
        environment::{Environment, EnvironmentPtr},
        value::Value,
    },
    error::{ErrorKind, ScriptError},
    interpreter::{
        ValueStack,
        program::{Program, bootstrap},
        vm::{Vm, VmOptions},
    },
};
