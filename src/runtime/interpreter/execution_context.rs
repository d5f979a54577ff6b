use crate::{
    lang::{
        code::{ByteCode, Op},
        source_buffer::SourceLocation,
    },
    runtime::{
        data_structures::{
            environment::{EnvironmentPtr, WordBody, WordInfo},
            value::Value,
        },
        error::{self, ErrorKind, script_error, script_error_str},
        interpreter::{
            CallItem, CallStack, Interpreter, InterpreterStack, ValueStack, WordManagement, vm::Vm,
        },
    },
};
use std::{io::Write, rc::Rc};
use tracing::{debug, trace};

/// A scripted word call in progress.  Word bodies run from this return stack inside one dispatch
/// loop, so deep script recursion grows the heap rather than the native stack.
struct Frame {
    code: Rc<ByteCode>,

    /// Where the caller resumes once the body finishes.
    return_pc: usize,

    /// Each body gets its own scope cursor, the caller's is put back on return.
    caller_environment: EnvironmentPtr,
}

/// Everything one run of a program touches.  The stack and VM are borrowed from the caller so they
/// outlive the run; the current scope is tracked here and moves as packages open and close.
pub struct ExecutionContext<'a> {
    stack: &'a mut ValueStack,
    vm: &'a mut Vm,

    /// Where definitions go and lookups start.
    environment: EnvironmentPtr,

    /// The location of the instruction being executed.
    current_location: Option<SourceLocation>,

    call_stack: CallStack,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        stack: &'a mut ValueStack,
        vm: &'a mut Vm,
        environment: EnvironmentPtr,
    ) -> ExecutionContext<'a> {
        ExecutionContext {
            stack,
            vm,
            environment,
            current_location: None,
            call_stack: CallStack::new(),
        }
    }

    /// Resolve a word for calling and record the call, enforcing the VM's call depth limit.
    fn begin_call(&mut self, location: &SourceLocation, word: &str) -> error::Result<WordInfo> {
        let Some(info) = self.environment.lookup(word) else {
            return script_error(
                self,
                ErrorKind::UndefinedWord,
                format!("Word '{}' is not defined.", word),
            );
        };

        if self.call_stack.len() >= self.vm.options().max_call_depth {
            return script_error(
                self,
                ErrorKind::CallDepth,
                format!(
                    "Calling '{}' exceeds the maximum call depth of {}.",
                    word,
                    self.vm.options().max_call_depth
                ),
            );
        }

        self.call_stack.push(CallItem::new(word.to_string(), location.clone()));
        Ok(info)
    }

    /// The dispatch loop.  Calls to scripted words push a frame and continue in the callee's body,
    /// the end of a body pops back to the caller.  Native words run directly.
    fn dispatch(
        &mut self,
        name: &str,
        code: &ByteCode,
        frames: &mut Vec<Frame>,
    ) -> error::Result<()> {
        let mut pc = 0;

        loop {
            let body: &ByteCode = match frames.last() {
                Some(frame) => frame.code.as_ref(),
                None => code,
            };

            let Some(instruction) = body.get(pc) else {
                let Some(frame) = frames.pop() else {
                    return Ok(());
                };

                self.environment = frame.caller_environment;
                pc = frame.return_pc;

                let _ = self.call_stack.pop();
                continue;
            };

            if let Some(location) = &instruction.location {
                self.current_location = Some(location.clone());
            }

            trace!(code = name, depth = frames.len(), pc, instruction = %instruction, "execute");

            match &instruction.op {
                Op::Primitive(primitive) => primitive.execute(self)?,

                Op::PushConstantValue(value) => self.push(value.clone()),

                Op::DefineWord(word, body) => {
                    debug!(word = word.as_str(), depth = self.environment.depth(), "defined word");

                    self.environment.define(WordInfo::new(
                        self.current_location.clone().unwrap_or_default(),
                        word.clone(),
                        String::new(),
                        WordBody::Scripted(body.clone()),
                    ));
                }

                Op::Execute(word) => {
                    let location = self.current_location.clone().unwrap_or_default();
                    let info = self.begin_call(&location, word)?;

                    match info.body {
                        WordBody::Native(handler) => {
                            (*handler)(self)?;
                            let _ = self.call_stack.pop();
                        }

                        WordBody::Scripted(callee) => {
                            frames.push(Frame {
                                code: callee,
                                return_pc: pc + 1,
                                caller_environment: self.environment.clone(),
                            });

                            pc = 0;
                            continue;
                        }
                    }
                }

                Op::JumpIfFalse(offset) => {
                    if !self.pop()?.is_truthy() {
                        pc += offset;
                        continue;
                    }
                }

                Op::Jump(offset) => {
                    pc += offset;
                    continue;
                }
            }

            pc += 1;
        }
    }
}

impl InterpreterStack for ExecutionContext<'_> {
    fn stack(&self) -> &ValueStack {
        &*self.stack
    }

    fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    fn pop(&mut self) -> error::Result<Value> {
        match self.stack.pop() {
            Some(value) => Ok(value),
            None => script_error_str(self, ErrorKind::StackUnderflow, "Stack underflow."),
        }
    }

    fn top(&self) -> error::Result<&Value> {
        match self.stack.last() {
            Some(value) => Ok(value),
            None => script_error_str(self, ErrorKind::StackUnderflow, "Stack underflow."),
        }
    }

    fn pop_as_number(&mut self) -> error::Result<f64> {
        match self.pop()? {
            Value::Number(number) => Ok(number),
            other => script_error(
                self,
                ErrorKind::Type,
                format!("Expected a number, found a {}.", other.type_name()),
            ),
        }
    }

    fn pop_as_string(&mut self) -> error::Result<String> {
        match self.pop()? {
            Value::String(text) => Ok(text),
            other => script_error(
                self,
                ErrorKind::Type,
                format!("Expected a string, found a {}.", other.type_name()),
            ),
        }
    }
}

impl WordManagement for ExecutionContext<'_> {
    fn current_location(&self) -> &Option<SourceLocation> {
        &self.current_location
    }

    fn environment(&self) -> &EnvironmentPtr {
        &self.environment
    }

    fn set_environment(&mut self, environment: EnvironmentPtr) {
        self.environment = environment;
    }

    fn execute_word_named(&mut self, location: &SourceLocation, word: &str) -> error::Result<()> {
        let info = self.begin_call(location, word)?;

        let result = match &info.body {
            WordBody::Native(handler) => (**handler)(self),

            WordBody::Scripted(code) => {
                let caller_environment = self.environment.clone();
                let result = self.execute_code(&info.name, code);

                self.environment = caller_environment;
                result
            }
        };

        let _ = self.call_stack.pop();
        result
    }

    fn call_stack(&self) -> &CallStack {
        &self.call_stack
    }
}

impl Interpreter for ExecutionContext<'_> {
    fn diagnostics(&mut self) -> &mut dyn Write {
        self.vm.sink()
    }

    fn execute_code(&mut self, name: &str, code: &ByteCode) -> error::Result<()> {
        let call_depth = self.call_stack.len();
        let mut frames = Vec::new();

        let result = self.dispatch(name, code, &mut frames);

        // An error leaves calls open, unwind them back to where this code was entered.
        if result.is_err() {
            if let Some(outermost) = frames.into_iter().next() {
                self.environment = outermost.caller_environment;
            }

            self.call_stack.truncate(call_depth);
        }

        result
    }
}
