use crate::{
    lang::{code::ByteCode, source_buffer::SourceLocation},
    runtime::{
        data_structures::{environment::EnvironmentPtr, value::Value},
        error,
    },
};
use std::{
    fmt::{self, Display, Formatter},
    io::Write,
};

/// The state of a single run: stack, current scope and call tracking.
pub mod execution_context;

/// The executable unit produced by compiling a script, and the bootstrap that runs it.
pub mod program;

/// The virtual machine settings and diagnostic output shared by every run.
pub mod vm;

/// A call stack item is a record of the executing word's name and the location within the original
/// source code from which it was called.
#[derive(Clone, Debug)]
pub struct CallItem {
    location: SourceLocation,
    word: String,
}

impl CallItem {
    pub fn new(word: String, location: SourceLocation) -> CallItem {
        CallItem { location, word }
    }

    /// Where in the source code was the call of this word found?
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn word(&self) -> &String {
        &self.word
    }
}

/// Make sure that this word can be nicely displayed to the user in event of an error.
impl Display for CallItem {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.word)
    }
}

/// The words currently being executed, innermost last.
pub type CallStack = Vec<CallItem>;

/// The data stack shared by the whole program.
pub type ValueStack = Vec<Value>;

/// Access to the data stack, for primitives and native words.
pub trait InterpreterStack {
    fn stack(&self) -> &ValueStack;

    fn push(&mut self, value: Value);

    /// Pop a value from the stack.  If the stack is empty a stack underflow error is returned.
    fn pop(&mut self) -> error::Result<Value>;

    /// Look at the top value without removing it.  Fails with a stack underflow on an empty stack.
    fn top(&self) -> error::Result<&Value>;

    /// Pop the top value, failing with a type error if it is not a number.
    fn pop_as_number(&mut self) -> error::Result<f64>;

    /// Pop the top value, failing with a type error if it is not a string.
    fn pop_as_string(&mut self) -> error::Result<String>;
}

/// Name resolution, scope tracking and word execution.
pub trait WordManagement {
    /// If currently set, the location of the instruction being executed.
    fn current_location(&self) -> &Option<SourceLocation>;

    /// The scope that definitions bind into and lookups start from.
    fn environment(&self) -> &EnvironmentPtr;

    /// Make a different scope current, used by `package` and `endpackage`.
    fn set_environment(&mut self, environment: EnvironmentPtr);

    /// Find a word by name in the current scope chain and execute it.  Supply the location the
    /// call comes from; use `location_here!()` when calling from native code.
    ///
    /// If the word is not found an undefined word error is returned.
    fn execute_word_named(&mut self, location: &SourceLocation, word: &str) -> error::Result<()>;

    /// The current word call stack.
    fn call_stack(&self) -> &CallStack;
}

/// Everything a primitive or native word can reach while a program runs.
pub trait Interpreter: InterpreterStack + WordManagement {
    /// Where `spew` and the host printing words write to.
    fn diagnostics(&mut self) -> &mut dyn Write;

    /// Run a block of byte code in the current scope.  The name is used for error reporting.
    fn execute_code(&mut self, name: &str, code: &ByteCode) -> error::Result<()>;
}

/// Definition of a native word handler.  Can be a lambda, a callable object or a Rust function.
pub type WordHandler = dyn Fn(&mut dyn Interpreter) -> error::Result<()>;

/// Register a native word in an environment, normally the host surface.
///
/// Required parameters are the environment to register in, the name of the word, the handler to
/// execute and a simple description of the word.
#[macro_export]
macro_rules! add_native_word {
    (
        $environment:expr ,
        $name:expr ,
        $function:expr ,
        $description:expr
    ) => {{
        use std::rc::Rc;
        use $crate::runtime::data_structures::environment::{WordBody, WordInfo};

        // Record where in the Rust source the word was registered from.
        $environment.define(WordInfo::new(
            $crate::location_here!(),
            $name.to_string(),
            $description.to_string(),
            WordBody::Native(Rc::new($function)),
        ));
    }};
}
