use crate::{
    lang::{
        code::{ByteCode, Instruction, Op},
        tokenizing::{Token, to_numeric, tokenize_from_file, tokenize_from_source},
    },
    runtime::{
        built_ins::primitives::Primitive,
        data_structures::value::Value,
        error::{self, ErrorKind, ScriptError},
    },
};
use std::rc::Rc;
use tracing::debug;

/// Report a structural problem found at the given token.
fn compile_error<T>(token: &Token, message: String) -> error::Result<T> {
    ScriptError::new_as_result(
        ErrorKind::Compile,
        Some(token.location().clone()),
        message,
        None,
    )
}

/// Index of the first token at or after `start` whose text is `text`.
fn find_token(tokens: &[Token], start: usize, text: &str) -> Option<usize> {
    tokens
        .iter()
        .skip(start)
        .position(|token| token.text() == text)
        .map(|offset| start + offset)
}

/// Compile `: name body ;` starting at the `:` token.  The definition ends at the first `;` after
/// the name, so a nested definition ends the outer one.  Returns the index of the first token after
/// the definition.
fn compile_definition(tokens: &[Token], start: usize, code: &mut ByteCode) -> error::Result<usize> {
    let colon = &tokens[start];

    let Some(name_token) = tokens.get(start + 1) else {
        return compile_error(colon, "Expected name after ':' word.".to_string());
    };

    let name = name_token.text();

    if name == ";" || name == ":" {
        return compile_error(name_token, format!("A word can not be named '{}'.", name));
    }

    let Some(end) = find_token(tokens, start + 1, ";") else {
        return compile_error(
            name_token,
            format!("Expected ';' to end definition of '{}'.", name),
        );
    };

    let body = compile_tokens(&tokens[start + 2..end])?;

    debug!(word = name, instructions = body.len(), "compiled word body");

    code.push(Instruction::new(
        Some(colon.location().clone()),
        Op::DefineWord(name.to_string(), Rc::new(body)),
    ));

    Ok(end + 1)
}

/// Compile `if <true branch> then <false branch> else` starting at the `if` token.  The first
/// `then` after the `if` and the first `else` after that `then` close the branches, so a
/// conditional nested in either branch can not find its own terminators.
fn compile_conditional(
    tokens: &[Token],
    start: usize,
    code: &mut ByteCode,
) -> error::Result<usize> {
    let if_token = &tokens[start];

    let Some(then_index) = find_token(tokens, start, "then") else {
        return compile_error(if_token, "Expected 'then' to end 'if'.".to_string());
    };

    let when_true = compile_tokens(&tokens[start + 1..then_index])?;

    let Some(else_index) = find_token(tokens, then_index, "else") else {
        return compile_error(
            &tokens[then_index],
            "Expected 'else' to end 'then'.".to_string(),
        );
    };

    let when_false = compile_tokens(&tokens[then_index + 1..else_index])?;

    // Skip the true branch and its trailing jump when the condition is false.
    code.push(Instruction::new(
        Some(if_token.location().clone()),
        Op::JumpIfFalse(when_true.len() + 2),
    ));
    code.extend(when_true);

    code.push(Instruction::new(
        Some(tokens[then_index].location().clone()),
        Op::Jump(when_false.len() + 1),
    ));
    code.extend(when_false);

    Ok(else_index + 1)
}

/// Compile a run of tokens into byte code.  Word definitions and conditionals consume the spans
/// they enclose and compile them recursively.  Anything that is not a primitive, a literal or one
/// of those two forms becomes a call looked up by name when it runs.
pub fn compile_tokens(tokens: &[Token]) -> error::Result<ByteCode> {
    let mut code = ByteCode::new();
    let mut index = 0;

    while index < tokens.len() {
        let token = &tokens[index];
        let location = Some(token.location().clone());

        if let Some(primitive) = Primitive::lookup(token.text()) {
            code.push(Instruction::new(location, Op::Primitive(primitive)));
            index += 1;
            continue;
        }

        if let Some(text) = token.string() {
            let value = Value::String(text.to_string());

            code.push(Instruction::new(location, Op::PushConstantValue(value)));
            index += 1;
            continue;
        }

        if let Some(number) = to_numeric(token.text()) {
            code.push(Instruction::new(location, Op::PushConstantValue(Value::Number(number))));
            index += 1;
            continue;
        }

        index = match token.text() {
            ":" => compile_definition(tokens, index, &mut code)?,
            "if" => compile_conditional(tokens, index, &mut code)?,
            word => {
                code.push(Instruction::new(location, Op::Execute(word.to_string())));
                index + 1
            }
        };
    }

    Ok(code)
}

/// Tokenize and compile an in memory source string.
pub fn process_source(path: &str, source: &str) -> error::Result<ByteCode> {
    let tokens = tokenize_from_source(path, source)?;
    let code = compile_tokens(&tokens)?;

    debug!(path, tokens = tokens.len(), instructions = code.len(), "compiled source");
    Ok(code)
}

/// Read, tokenize and compile a source file.
pub fn process_source_file(path: &str) -> error::Result<ByteCode> {
    let tokens = tokenize_from_file(path)?;
    let code = compile_tokens(&tokens)?;

    debug!(path, tokens = tokens.len(), instructions = code.len(), "compiled file");
    Ok(code)
}
