use crate::{
    add_native_word,
    runtime::{
        data_structures::{
            environment::EnvironmentPtr,
            value::{HostRef, Value},
        },
        error,
        interpreter::Interpreter,
    },
};
use std::rc::Rc;

/// An object created for a script by `host.object`.  Stands in for whatever an embedder would
/// really hand out, a window or a document node for example.
#[derive(Debug, PartialEq)]
pub struct HostObject {
    pub kind: String,
}

/// Pop a value and print it followed by a new line.
///
/// Signature: `value -- `
fn word_print(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    writeln!(interpreter.diagnostics(), "{}", value)?;
    Ok(())
}

/// Print the whole stack, bottom first, without changing it.
///
/// Signature: ` -- `
fn word_print_stack(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let listing: Vec<String> = interpreter
        .stack()
        .iter()
        .map(|value| format!("{:?}", value))
        .collect();

    writeln!(interpreter.diagnostics(), "<{}> {}", listing.len(), listing.join(" "))?;
    Ok(())
}

/// Print every word visible from the current scope.
///
/// Signature: ` -- `
fn word_print_words(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let listing = interpreter.environment().to_string();

    write!(interpreter.diagnostics(), "{}", listing)?;
    Ok(())
}

/// Create a host object of the named kind.
///
/// Signature: `kind -- object`
fn word_host_object(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let kind = interpreter.pop_as_string()?;
    let object = HostObject { kind: kind.clone() };

    interpreter.push(Value::Host(HostRef::new(&kind, Rc::new(object))));
    Ok(())
}

/// Register the demonstration host surface.  These words live in the parentless environment at the
/// end of the scope chain, so scripts reach them the same way as their own words.
pub fn register_host_words(host: &EnvironmentPtr) {
    add_native_word!(host, "print", word_print, "Pop a value and print it.");

    add_native_word!(
        host,
        ".s",
        word_print_stack,
        "Print the stack without changing it."
    );

    add_native_word!(
        host,
        ".w",
        word_print_words,
        "List the words visible from the current scope."
    );

    add_native_word!(
        host,
        "host.object",
        word_host_object,
        "Create an opaque host object of the kind named by the string on the stack."
    );
}
