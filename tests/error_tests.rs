use test_case::test_case;
use wordstack::runtime::error::{MAX_LISTED_CALLS, Result};
use wordstack::runtime::interpreter::vm::{CaptureBuffer, DEFAULT_MAX_CALL_DEPTH};
use wordstack::{Environment, ErrorKind, Program, Value, ValueStack, Vm, VmOptions, bootstrap};

fn eval_with(options: VmOptions, source: &str) -> Result<ValueStack> {
    let program = Program::compile("<test>", source)?;
    let mut vm = Vm::with_sink(options, Box::new(CaptureBuffer::new()));

    bootstrap(&program, &mut vm, &Environment::new_host())
}

fn eval(source: &str) -> Result<ValueStack> {
    eval_with(VmOptions::default(), source)
}

#[test_case("\"open", ErrorKind::Parse; "unterminated string")]
#[test_case(":", ErrorKind::Compile; "definition without name")]
#[test_case(": ;", ErrorKind::Compile; "semicolon as name")]
#[test_case(": : ;", ErrorKind::Compile; "colon as name")]
#[test_case(": foo 1 2 +", ErrorKind::Compile; "definition without terminator")]
#[test_case("1 if 2", ErrorKind::Compile; "if without then")]
#[test_case("1 if 2 then 3", ErrorKind::Compile; "then without else")]
#[test_case("frob", ErrorKind::UndefinedWord; "undefined word")]
#[test_case("then", ErrorKind::UndefinedWord; "stray keyword is a word reference")]
#[test_case("drop", ErrorKind::StackUnderflow; "drop on empty stack")]
#[test_case("dup", ErrorKind::StackUnderflow; "dup on empty stack")]
#[test_case("1 +", ErrorKind::StackUnderflow; "add with one operand")]
#[test_case("spew", ErrorKind::StackUnderflow; "spew on empty stack")]
#[test_case("if 1 then 2 else", ErrorKind::StackUnderflow; "if on empty stack")]
#[test_case("1 \"a\" -", ErrorKind::Type; "subtract a string")]
#[test_case("1 2 = 3 +", ErrorKind::Type; "add a boolean")]
#[test_case("1 \"a\" >", ErrorKind::Type; "compare mixed types")]
#[test_case("endpackage endpackage", ErrorKind::Scope; "close past the host")]
fn error_kinds(source: &str, kind: ErrorKind) {
    let error = eval(source).unwrap_err();

    assert_eq!(error.kind(), kind, "unexpected error: {}", error);
}

#[test]
fn compile_errors_stop_before_running() {
    let output = CaptureBuffer::new();
    let mut vm = Vm::with_sink(VmOptions::default(), Box::new(output.clone()));

    let result = Program::compile("<test>", "1 spew : broken")
        .and_then(|program| bootstrap(&program, &mut vm, &Environment::new_host()));

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Compile);
    assert_eq!(output.contents(), "");
}

#[test]
fn undefined_word_reports_name_and_location() {
    let error = eval("1 2 +\n  frob").unwrap_err();
    let location = error.location().clone().expect("a location");

    assert!(error.error().contains("'frob'"));
    assert_eq!(location.path(), "<test>");
    assert_eq!(location.line(), 2);
    assert_eq!(location.column(), 3);
}

#[test]
fn runtime_errors_carry_the_call_stack() {
    let error = eval(": inner frob ; : outer inner ; outer").unwrap_err();
    let call_stack = error.call_stack().clone().expect("a call stack");

    let words: Vec<&str> = call_stack.iter().map(|item| item.word().as_str()).collect();

    assert_eq!(words, vec!["outer", "inner"]);
    assert!(error.to_string().contains("Call stack"));
}

#[test]
fn stack_keeps_values_pushed_before_an_error() {
    let program = Program::compile("<test>", "1 2 frob 3").unwrap();
    let mut vm = Vm::with_sink(VmOptions::default(), Box::new(CaptureBuffer::new()));
    let root = Environment::new_child(&Environment::new_host());
    let mut stack = ValueStack::new();

    assert!(program.run(&mut stack, &mut vm, &root).is_err());
    assert_eq!(stack, vec![Value::Number(1.0), Value::Number(2.0)]);
}

#[test]
fn runaway_recursion_hits_the_call_depth_limit() {
    let options = VmOptions { max_call_depth: 50 };
    let error = eval_with(options, ": forever forever ; forever").unwrap_err();

    assert_eq!(error.kind(), ErrorKind::CallDepth);
}

#[test]
fn bounded_recursion_within_the_limit_runs() {
    let options = VmOptions { max_call_depth: 50 };
    let source = ": down dup 0 > if 1 - down then else ; 10 down";

    assert_eq!(eval_with(options, source).unwrap(), vec![Value::Number(0.0)]);
}

#[test]
fn runaway_recursion_with_default_options_is_reported() {
    let error = eval(": forever forever ; forever").unwrap_err();

    assert_eq!(error.kind(), ErrorKind::CallDepth);
    assert_eq!(error.call_stack().as_ref().map(Vec::len), Some(DEFAULT_MAX_CALL_DEPTH));
}

#[test]
fn deep_recursion_within_the_default_limit_runs() {
    let source = ": down dup 0 > if 1 - down then else ; 900 down";

    assert_eq!(eval(source).unwrap(), vec![Value::Number(0.0)]);
}

#[test]
fn long_call_stacks_are_summarized() {
    let report = eval(": forever forever ; forever").unwrap_err().to_string();
    let listed = report.lines().filter(|line| line.ends_with(": forever")).count();

    assert_eq!(listed, MAX_LISTED_CALLS);
    assert!(report.contains(&format!("... {} more", DEFAULT_MAX_CALL_DEPTH - MAX_LISTED_CALLS)));
}

#[test]
fn short_call_stacks_are_listed_in_full() {
    let report = eval(": inner frob ; : outer inner ; outer").unwrap_err().to_string();

    assert!(report.contains(": inner"));
    assert!(report.contains(": outer"));
    assert!(!report.contains("more"));
}
