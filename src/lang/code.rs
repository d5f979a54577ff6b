use crate::{
    lang::source_buffer::SourceLocation,
    runtime::{built_ins::primitives::Primitive, data_structures::value::Value},
};
use std::{
    fmt::{self, Display, Formatter},
    rc::Rc,
};

/// The operations that can be performed by the virtual machine.
#[derive(Clone, PartialEq, Debug)]
pub enum Op {
    /// Run one of the fixed built-in stack operations.
    Primitive(Primitive),

    /// Push a literal number or string onto the stack.
    PushConstantValue(Value),

    /// Bind the compiled body to the name in whatever environment is current when this instruction
    /// runs.
    DefineWord(String, Rc<ByteCode>),

    /// Look the word up in the current environment chain and call it.
    Execute(String),

    /// Pop a value and, if it is falsy, skip forward by the given number of instructions.  The
    /// offset is relative to this instruction.
    JumpIfFalse(usize),

    /// Skip forward by the given number of instructions, relative to this one.
    Jump(usize),
}

/// A single instruction and the source location it was compiled from.
#[derive(Clone, PartialEq, Debug)]
pub struct Instruction {
    /// Instructions built by hand rather than compiled from text will not have a location.
    pub location: Option<SourceLocation>,

    pub op: Op,
}

impl Instruction {
    pub fn new(location: Option<SourceLocation>, op: Op) -> Instruction {
        Instruction { location, op }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.op {
            Op::Primitive(primitive) => write!(f, "Primitive         {}", primitive),
            Op::PushConstantValue(Value::String(text)) => {
                write!(f, "PushConstantValue {:?}", text)
            }
            Op::PushConstantValue(value) => write!(f, "PushConstantValue {}", value),
            Op::DefineWord(name, body) => {
                write!(f, "DefineWord        {} ({} instructions)", name, body.len())
            }
            Op::Execute(name) => write!(f, "Execute           {}", name),
            Op::JumpIfFalse(offset) => write!(f, "JumpIfFalse       +{}", offset),
            Op::Jump(offset) => write!(f, "Jump              +{}", offset),
        }
    }
}

/// A flat run of instructions making up a word body or a whole program.
pub type ByteCode = Vec<Instruction>;

/// Pretty print the byte code for debugging purposes.  Word bodies are listed indented beneath the
/// instruction that defines them.
pub fn pretty_print_code(code: &ByteCode) -> String {
    fn print_level(result: &mut String, code: &ByteCode, depth: usize) {
        use std::fmt::Write;

        for (index, instruction) in code.iter().enumerate() {
            writeln!(result, "{:indent$}{:4}: {}", "", index, instruction, indent = depth * 6)
                .expect("Writing to String should never fail.");

            if let Op::DefineWord(_, body) = &instruction.op {
                print_level(result, body, depth + 1);
            }
        }
    }

    let mut result = String::with_capacity(code.len() * 20);

    print_level(&mut result, code, 0);
    result
}
