use crate::runtime::{
    data_structures::{environment::Environment, value::Value},
    error::{self, ErrorKind, script_error, script_error_str},
    interpreter::Interpreter,
};
use lazy_static::lazy_static;
use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
};
use tracing::debug;

/// The fixed set of built-in stack operations.  These names are resolved at compile time and can
/// not be redefined by scripts.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Primitive {
    Dup,
    Drop,
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    GreaterThan,
    Not,
    Spew,
    Package,
    EndPackage,
}

lazy_static! {
    /// Reserved name to primitive lookup used by the compiler.
    static ref PRIMITIVES: HashMap<&'static str, Primitive> = Primitive::ALL
        .iter()
        .map(|primitive| (primitive.name(), *primitive))
        .collect();
}

impl Display for Primitive {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Primitive {
    pub const ALL: [Primitive; 12] = [
        Primitive::Dup,
        Primitive::Drop,
        Primitive::Add,
        Primitive::Subtract,
        Primitive::Multiply,
        Primitive::Divide,
        Primitive::Equal,
        Primitive::GreaterThan,
        Primitive::Not,
        Primitive::Spew,
        Primitive::Package,
        Primitive::EndPackage,
    ];

    /// Find the primitive reserved under the given name, if any.
    pub fn lookup(name: &str) -> Option<Primitive> {
        PRIMITIVES.get(name).copied()
    }

    /// The reserved name of the primitive in script source.
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Dup => "dup",
            Primitive::Drop => "drop",
            Primitive::Add => "+",
            Primitive::Subtract => "-",
            Primitive::Multiply => "*",
            Primitive::Divide => "/",
            Primitive::Equal => "=",
            Primitive::GreaterThan => ">",
            Primitive::Not => "not",
            Primitive::Spew => "spew",
            Primitive::Package => "package",
            Primitive::EndPackage => "endpackage",
        }
    }

    /// Run the operation against the interpreter's stack and environment.
    pub fn execute(self, interpreter: &mut dyn Interpreter) -> error::Result<()> {
        match self {
            Primitive::Dup => word_dup(interpreter),
            Primitive::Drop => word_drop(interpreter),
            Primitive::Add => word_add(interpreter),
            Primitive::Subtract => numeric_operation(interpreter, self, |b, a| b - a),
            Primitive::Multiply => numeric_operation(interpreter, self, |b, a| b * a),
            Primitive::Divide => numeric_operation(interpreter, self, |b, a| b / a),
            Primitive::Equal => word_equal(interpreter),
            Primitive::GreaterThan => word_greater_than(interpreter),
            Primitive::Not => word_not(interpreter),
            Primitive::Spew => word_spew(interpreter),
            Primitive::Package => word_package(interpreter),
            Primitive::EndPackage => word_end_package(interpreter),
        }
    }
}

/// Pop the two operands of a binary operation.  The value that was on top is `a`, the one beneath
/// it is `b`, and they are returned as `(b, a)` so operators read left to right.
fn pop_operands(interpreter: &mut dyn Interpreter) -> error::Result<(Value, Value)> {
    let a = interpreter.pop()?;
    let b = interpreter.pop()?;

    Ok((b, a))
}

/// Duplicate the top value on the data stack.
///
/// Signature: `value -- value value`
fn word_dup(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = interpreter.top()?.clone();

    interpreter.push(value);
    Ok(())
}

/// Signature: `value -- `
fn word_drop(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let _ = interpreter.pop()?;

    Ok(())
}

/// Add two numbers, or concatenate when either side is a string.
///
/// Signature: `b a -- b+a`
fn word_add(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let result = match pop_operands(interpreter)? {
        (Value::Number(b), Value::Number(a)) => Value::Number(b + a),
        (b @ Value::String(_), a) | (b, a @ Value::String(_)) => {
            Value::String(format!("{}{}", b, a))
        }
        (b, a) => {
            return script_error(
                interpreter,
                ErrorKind::Type,
                format!("Can not add {} and {}.", b.type_name(), a.type_name()),
            );
        }
    };

    interpreter.push(result);
    Ok(())
}

/// Shared body of `-`, `*` and `/`, which only work on numbers.
///
/// Signature: `b a -- result`
fn numeric_operation(
    interpreter: &mut dyn Interpreter,
    primitive: Primitive,
    operation: fn(f64, f64) -> f64,
) -> error::Result<()> {
    match pop_operands(interpreter)? {
        (Value::Number(b), Value::Number(a)) => {
            interpreter.push(Value::Number(operation(b, a)));
            Ok(())
        }

        (b, a) => script_error(
            interpreter,
            ErrorKind::Type,
            format!(
                "Operator {} expects two numbers, found {} and {}.",
                primitive,
                b.type_name(),
                a.type_name()
            ),
        ),
    }
}

/// Strict equality, values of different types are never equal.
///
/// Signature: `b a -- bool`
fn word_equal(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (b, a) = pop_operands(interpreter)?;

    interpreter.push(Value::Bool(b == a));
    Ok(())
}

/// Signature: `b a -- bool`
fn word_greater_than(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let result = match pop_operands(interpreter)? {
        (Value::Number(b), Value::Number(a)) => b > a,
        (Value::String(b), Value::String(a)) => b > a,
        (b, a) => {
            return script_error(
                interpreter,
                ErrorKind::Type,
                format!("Can not compare {} with {}.", b.type_name(), a.type_name()),
            );
        }
    };

    interpreter.push(Value::Bool(result));
    Ok(())
}

/// Signature: `value -- bool`
fn word_not(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    interpreter.push(Value::Bool(!value.is_truthy()));
    Ok(())
}

/// Write the top value to the diagnostic sink, leaving the stack as it was.
///
/// Signature: `value -- value`
fn word_spew(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let text = interpreter.top()?.to_string();

    writeln!(interpreter.diagnostics(), "{}", text)?;
    Ok(())
}

/// Open a new scope as a child of the current one.
///
/// Signature: ` -- `
fn word_package(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let child = Environment::new_child(interpreter.environment());

    debug!(depth = child.depth(), "opened package");
    interpreter.set_environment(child);

    Ok(())
}

/// Close the current scope, leaving it on the stack, and return to its parent.
///
/// Signature: ` -- package`
fn word_end_package(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let current = interpreter.environment().clone();

    let Some(parent) = current.parent().cloned() else {
        return script_error_str(
            interpreter,
            ErrorKind::Scope,
            "No enclosing scope for 'endpackage' to return to.",
        );
    };

    debug!(depth = current.depth(), words = current.len(), "closed package");

    interpreter.push(Value::Environment(current));
    interpreter.set_environment(parent);

    Ok(())
}
