use std::{ error,
           fmt::{ self, Debug, Display, Formatter } };
use thiserror::Error;
use crate::{ runtime::interpreter::{ CallStack, Interpreter },
             lang::source_buffer::SourceLocation };



pub type Result<T> = std::result::Result<T, ScriptError>;


/// How many of the innermost calls an error report lists before summarizing the rest.
pub const MAX_LISTED_CALLS: usize = 16;



/// The broad category of a failure.  Embedders match on this instead of parsing messages.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum ErrorKind
{
    /// Malformed source text, an unterminated string literal for example.
    #[error("parse error")]
    Parse,

    /// A structural problem found while compiling, such as a definition missing its `;`.
    #[error("compile error")]
    Compile,

    /// A word reference that resolved nowhere in the environment chain.
    #[error("undefined word")]
    UndefinedWord,

    /// A value was read from an empty stack.
    #[error("stack underflow")]
    StackUnderflow,

    /// A primitive was given operands of the wrong type.
    #[error("type error")]
    Type,

    /// The package scope chain was closed past its root.
    #[error("scope error")]
    Scope,

    /// Word calls nested deeper than the VM allows.
    #[error("call depth exceeded")]
    CallDepth,

    #[error("i/o error")]
    Io
}



/// Any error that occurs while compiling or running a script.
#[derive(Clone)]
pub struct ScriptError
{
    kind: ErrorKind,

    /// The location in the source code the error occurred, if available.
    location: Option<SourceLocation>,

    /// The description of the error.
    error: String,

    /// The script's call stack at the time of the error, if available.
    call_stack: Option<CallStack>
}


impl error::Error for ScriptError
{
}


impl Display for ScriptError
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        match &self.location
        {
            Some(location) => write!(f, "{}: {}: {}", location, self.kind, self.error)?,
            None => write!(f, "{}: {}", self.kind, self.error)?
        }

        if let Some(call_stack) = &self.call_stack
            && !call_stack.is_empty()
        {
            write!(f, "\n\nCall stack\n")?;

            for item in call_stack.iter().rev().take(MAX_LISTED_CALLS)
            {
                writeln!(f, "  {}", item)?;
            }

            if call_stack.len() > MAX_LISTED_CALLS
            {
                writeln!(f, "  ... {} more", call_stack.len() - MAX_LISTED_CALLS)?;
            }
        }

        Ok(())
    }
}


/// Returning the error from main prints it through Debug, so keep it readable.
impl Debug for ScriptError
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        write!(f, "{}", self)
    }
}


impl ScriptError
{
    pub fn new(kind: ErrorKind,
               location: Option<SourceLocation>,
               error: String,
               call_stack: Option<CallStack>) -> ScriptError
    {
        ScriptError
            {
                kind,
                location,
                error,
                call_stack
            }
    }

    /// Create a new ScriptError and wrap it in a Result::Err.
    pub fn new_as_result<T>(kind: ErrorKind,
                            location: Option<SourceLocation>,
                            error: String,
                            call_stack: Option<CallStack>) -> Result<T>
    {
        Err(ScriptError::new(kind, location, error, call_stack))
    }

    pub fn kind(&self) -> ErrorKind
    {
        self.kind
    }

    pub fn location(&self) -> &Option<SourceLocation>
    {
        &self.location
    }

    /// The description of the error, without location or kind.
    pub fn error(&self) -> &String
    {
        &self.error
    }

    pub fn call_stack(&self) -> &Option<CallStack>
    {
        &self.call_stack
    }
}


impl From<std::io::Error> for ScriptError
{
    fn from(error: std::io::Error) -> ScriptError
    {
        ScriptError::new(ErrorKind::Io, None, format!("I/O error: {}", error), None)
    }
}



/// Create a ScriptError wrapped in a Result::Err using the interpreter's current location and call
/// stack.
pub fn script_error<T>(interpreter: &dyn Interpreter, kind: ErrorKind, message: String) -> Result<T>
{
    let location = interpreter.current_location().clone();
    let call_stack = interpreter.call_stack().clone();

    ScriptError::new_as_result(kind, location, message, Some(call_stack))
}


pub fn script_error_str<T>(interpreter: &dyn Interpreter, kind: ErrorKind, message: &str) -> Result<T>
{
    script_error(interpreter, kind, message.to_string())
}
