//! Boundary cases: the small set of edge behaviors the engine is required to
//! get right even though they fall outside the main end-to-end scenarios.

use loom::interp::host::InMemoryHost;
use loom::{CompletionCode, EngineLimits, Interpreter};

fn run(script: &str) -> (CompletionCode, String) {
    let mut interp = Interpreter::new(Box::new(InMemoryHost::new()), EngineLimits::default());
    let (code, value) = interp.eval(script);
    (code, value.as_str().to_string())
}

#[test]
fn empty_script_is_ok_with_empty_result() {
    let (code, result) = run("");
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "");
}

#[test]
fn comment_only_script_is_ok_with_empty_result() {
    let (code, result) = run("# just a comment\n# another one\n");
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "");
}

#[test]
fn deeply_nested_braces_parse_without_overflow() {
    let depth = 150;
    let script = format!("set x {}{}{}", "{".repeat(depth), "a", "}".repeat(depth));
    let (code, _) = run(&script);
    assert_eq!(code, CompletionCode::Ok);
}

#[test]
fn unterminated_brace_is_a_syntax_error() {
    let (code, result) = run("set x {abc");
    assert_eq!(code, CompletionCode::Error);
    assert!(result.contains("brace") || result.contains("syntax"), "unexpected message: {result}");
}

#[test]
fn unterminated_quote_is_a_syntax_error() {
    let (code, result) = run("set x \"abc");
    assert_eq!(code, CompletionCode::Error);
    assert!(result.contains("quote") || result.contains("syntax"), "unexpected message: {result}");
}

#[test]
fn array_reference_with_empty_index_resolves_to_empty_key_element() {
    let (code, result) = run("set a() hello; set a()");
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "hello");
}

#[test]
fn array_reference_read_via_dollar_syntax() {
    let (code, result) = run("set a(k) v; set x $a(k); set x");
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "v");
}

#[test]
fn upvar_level_past_global_is_an_error() {
    let (code, result) = run("upvar #5 other local");
    assert_eq!(code, CompletionCode::Error);
    assert!(result.to_lowercase().contains("level") || result.to_lowercase().contains("not found"), "unexpected message: {result}");
}

#[test]
fn invoking_a_completed_coroutine_is_invalid_command_name() {
    // `coroutine c once` only registers `c`; the first call to `c` is what
    // actually runs `once` to completion, so a second call is needed to
    // observe the post-`done` error.
    let script = "proc once {} { return done }; coroutine c once; c; c";
    let (code, result) = run(script);
    assert_eq!(code, CompletionCode::Error);
    assert!(result.contains("invalid command name"), "unexpected message: {result}");
}

#[test]
fn yield_outside_any_coroutine_is_an_error() {
    let (code, result) = run("yield");
    assert_eq!(code, CompletionCode::Error);
    assert!(result.contains("yield") && result.contains("coroutine"), "unexpected message: {result}");
}

#[test]
fn split_join_round_trip_for_whitespace_free_elements() {
    let (code, result) = run("set l {a b c}; join [split [join $l { }] { }] { }");
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "a b c");
}

#[test]
fn subst_with_all_substitutions_disabled_is_byte_for_byte() {
    let script = r#"subst -nobackslashes -nocommands -novariables {a $b [c] \n}"#;
    let (code, result) = run(script);
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "a $b [c] \\n");
}

#[test]
fn eval_of_a_constructed_list_runs_it_as_a_command() {
    let (code, result) = run(r#"proc a {b c} { list got $b $c }; eval [list a b c]"#);
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "got b c");
}

#[test]
fn break_outside_any_loop_is_an_error() {
    let (code, result) = run("proc f {} { break }; f");
    assert_eq!(code, CompletionCode::Error);
    assert!(result.contains("break"), "unexpected message: {result}");
}
