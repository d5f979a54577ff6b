use std::rc::Rc;
use wordstack::runtime::interpreter::vm::CaptureBuffer;
use wordstack::{Environment, EnvironmentPtr, ErrorKind, Program, Value, ValueStack, Vm, VmOptions};

/// Run a program in a root scope we keep hold of, so tests can inspect it afterwards.
fn run_in(root: &EnvironmentPtr, source: &str) -> wordstack::runtime::error::Result<ValueStack> {
    let program = Program::compile("<test>", source)?;
    let mut vm = Vm::with_sink(VmOptions::default(), Box::new(CaptureBuffer::new()));
    let mut stack = ValueStack::new();

    program.run(&mut stack, &mut vm, root)?;
    Ok(stack)
}

fn new_root() -> EnvironmentPtr {
    Environment::new_child(&Environment::new_host())
}

#[test]
fn endpackage_pushes_the_closed_frame() {
    let root = new_root();
    let stack = run_in(&root, "package : inner 7 ; endpackage").unwrap();

    assert_eq!(stack.len(), 1);

    let frame = stack[0].as_environment().expect("a package frame");

    assert!(frame.contains_local("inner"));
    assert!(Rc::ptr_eq(frame.parent().unwrap(), &root));
    assert!(!root.contains_local("inner"));
}

#[test]
fn words_are_visible_inside_their_package() {
    let root = new_root();
    let stack = run_in(&root, "package : inner 7 ; inner endpackage drop").unwrap();

    assert_eq!(stack, vec![Value::Number(7.0)]);
}

#[test]
fn words_are_visible_in_nested_packages() {
    let root = new_root();
    let source = "package : inner 7 ; package inner endpackage drop endpackage drop";

    assert_eq!(run_in(&root, source).unwrap(), vec![Value::Number(7.0)]);
}

#[test]
fn words_are_hidden_from_the_parent() {
    let root = new_root();
    let error = run_in(&root, "package : inner 7 ; endpackage drop inner").unwrap_err();

    assert_eq!(error.kind(), ErrorKind::UndefinedWord);
}

#[test]
fn package_can_shadow_an_outer_word() {
    let root = new_root();
    let source = ": n 1 ; package : n 2 ; n endpackage drop n";

    assert_eq!(
        run_in(&root, source).unwrap(),
        vec![Value::Number(2.0), Value::Number(1.0)]
    );
}

#[test]
fn word_bodies_resolve_names_in_the_callers_scope() {
    let root = new_root();
    let source = ": call-helper helper ; package : helper 5 ; call-helper endpackage drop";

    assert_eq!(run_in(&root, source).unwrap(), vec![Value::Number(5.0)]);
}

#[test]
fn package_opened_in_a_word_stays_in_the_word() {
    let root = new_root();
    let stack = run_in(&root, ": open package ; open : x 1 ;").unwrap();

    assert!(stack.is_empty());
    assert!(root.contains_local("x"));
    assert!(root.contains_local("open"));
}

#[test]
fn closed_frames_are_distinct_values() {
    let root = new_root();
    let source = "package endpackage package endpackage = package endpackage dup =";
    let stack = run_in(&root, source).unwrap();

    assert_eq!(stack, vec![Value::Bool(false), Value::Bool(true)]);
}

#[test]
fn endpackage_at_the_root_returns_to_the_host() {
    let host = Environment::new_host();
    let root = Environment::new_child(&host);
    let stack = run_in(&root, "endpackage : on-host 1 ;").unwrap();

    assert_eq!(stack.len(), 1);
    assert!(Rc::ptr_eq(stack[0].as_environment().unwrap(), &root));
    assert!(host.contains_local("on-host"));
}

#[test]
fn endpackage_past_the_host_is_a_scope_error() {
    let root = new_root();
    let error = run_in(&root, "endpackage endpackage").unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Scope);
}
