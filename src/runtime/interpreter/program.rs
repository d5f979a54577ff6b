use crate::{
    lang::{
        code::{ByteCode, pretty_print_code},
        compilation::{process_source, process_source_file},
    },
    runtime::{
        data_structures::environment::{Environment, EnvironmentPtr},
        error,
        interpreter::{Interpreter, ValueStack, execution_context::ExecutionContext, vm::Vm},
    },
};
use std::rc::Rc;
use tracing::debug;

/// A compiled script, ready to run.  Running does not consume or alter the program, so the same
/// program can be run any number of times against fresh stacks.
#[derive(Clone)]
pub struct Program {
    /// The path or tag the program was compiled from, used in error reports.
    name: String,
    code: Rc<ByteCode>,
}

impl Program {
    pub fn new(name: &str, code: ByteCode) -> Program {
        Program {
            name: name.to_string(),
            code: Rc::new(code),
        }
    }

    /// Compile source text.  The path tags locations in errors, for example "\<eval\>".
    pub fn compile(path: &str, source: &str) -> error::Result<Program> {
        Ok(Program::new(path, process_source(path, source)?))
    }

    /// Read and compile a script file.
    pub fn compile_file(path: &str) -> error::Result<Program> {
        Ok(Program::new(path, process_source_file(path)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &ByteCode {
        &self.code
    }

    /// A numbered listing of the compiled instructions.
    pub fn listing(&self) -> String {
        pretty_print_code(&self.code)
    }

    /// Run every instruction once against the given stack, starting in the `root` scope.  The stack
    /// and any environments reachable from `root` keep whatever the program did to them, even when
    /// an error stops the run part way.
    pub fn run(
        &self,
        stack: &mut ValueStack,
        vm: &mut Vm,
        root: &EnvironmentPtr,
    ) -> error::Result<()> {
        debug!(program = self.name.as_str(), instructions = self.code.len(), "running program");

        let mut context = ExecutionContext::new(stack, vm, root.clone());
        context.execute_code(&self.name, &self.code)
    }
}

/// Run a program once on a fresh empty stack in a fresh root scope whose parent is the `host`
/// surface, returning the final stack.
pub fn bootstrap(
    program: &Program,
    vm: &mut Vm,
    host: &EnvironmentPtr,
) -> error::Result<ValueStack> {
    let root = Environment::new_child(host);
    let mut stack = ValueStack::new();

    program.run(&mut stack, vm, &root)?;
    Ok(stack)
}
