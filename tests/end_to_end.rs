//! Whole-script scenarios run through the embedder entry point
//! (`Interpreter::eval`), mirroring the numbered end-to-end cases and
//! boundary cases this engine is meant to satisfy.

use loom::interp::host::InMemoryHost;
use loom::{CompletionCode, EngineLimits, Interpreter};

fn run(script: &str) -> (CompletionCode, String) {
    let mut interp = Interpreter::new(Box::new(InMemoryHost::new()), EngineLimits::default());
    let (code, value) = interp.eval(script);
    (code, value.as_str().to_string())
}

#[test]
fn basic_dispatch() {
    let (code, result) = run("set x 41; incr x; set x");
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "42");
}

#[test]
fn user_proc_with_defaults_and_rest() {
    let (code, result) = run("proc f {a {b 10} args} {list $a $b $args}; list [f 1] [f 1 2] [f 1 2 3 4]");
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "{1 10 {}} {1 2 {}} {1 2 {3 4}}");
}

#[test]
fn upvar_across_two_call_frames() {
    let (code, result) = run("proc outer {} {set v 0; middle; return $v}; proc middle {} {upvar 1 v u; set u 7}; outer");
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "7");
}

#[test]
fn catch_traps_an_error() {
    let (code, result) = run("catch {error oops} msg opts; list $msg [dict get $opts -code]");
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "oops 1");
}

#[test]
fn coroutine_yield_and_resume() {
    let script = r#"
        proc gen {} { yield; foreach x {a b c} { yield $x } }
        coroutine g gen
        list [g] [g] [g] [g]
    "#;
    let (code, result) = run(script);
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "{} a b c");
}

#[test]
fn yieldto_shares_yield_replay_gate() {
    let script = r#"
        proc g {} { yieldto list 1; yield 2 }
        coroutine c g
        list [c] [c] [c]
    "#;
    let (code, result) = run(script);
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "1 2 {}");
}

#[test]
fn resumed_for_loop_skips_completed_iterations() {
    let script = r#"
        set ::calls {}
        proc gen {} { for {set i 0} {$i < 3} {incr i} { lappend ::calls $i; yield $i } }
        coroutine c gen
        list [c] [c] [c] [c] $::calls
    "#;
    let (code, result) = run(script);
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "0 1 2 {} {0 0 1 1 2 2}");
}

#[test]
fn break_out_of_nested_foreach() {
    let script = r#"
        set acc {}
        foreach i {1 2 3} { foreach j {10 20} { if {$j == 20} break; lappend acc "$i.$j" } }
        set acc
    "#;
    let (code, result) = run(script);
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "1.10 2.10 3.10");
}

#[test]
fn try_runs_finally_and_returns_body_result() {
    let script = "set log {}; try { set x 1 } finally { lappend log ran }; list $x $log";
    let (code, result) = run(script);
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "1 ran");
}

#[test]
fn try_dispatches_to_matching_on_handler() {
    let script = r#"try { error boom } on error {msg} { list caught $msg }"#;
    let (code, result) = run(script);
    assert_eq!(code, CompletionCode::Ok);
    assert_eq!(result, "caught boom");
}
