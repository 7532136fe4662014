//! Builtin command table (§4.5 step 1: "the engine's own fixed builtin
//! table, checked first"). Each submodule groups builtins the way the
//! teacher's `commands/` directory groups its shell builtins by concern.

pub mod catch_try;
pub mod control_flow;
pub mod coroutine_cmd;
pub mod core;
pub mod list_cmd;
pub mod proc_cmd;
pub mod scope_cmd;

use std::collections::HashMap;

use super::interpreter::BuiltinFn;

pub fn table() -> HashMap<&'static str, BuiltinFn> {
    let mut t: HashMap<&'static str, BuiltinFn> = HashMap::new();
    t.insert("set", scope_cmd::set_cmd);
    t.insert("unset", scope_cmd::unset_cmd);
    t.insert("global", scope_cmd::global_cmd);
    t.insert("upvar", scope_cmd::upvar_cmd);
    t.insert("variable", scope_cmd::variable_cmd);

    t.insert("proc", proc_cmd::proc_cmd);
    t.insert("return", proc_cmd::return_cmd);

    t.insert("if", control_flow::if_cmd);
    t.insert("while", control_flow::while_cmd);
    t.insert("for", control_flow::for_cmd);
    t.insert("foreach", control_flow::foreach_cmd);
    t.insert("break", control_flow::break_cmd);
    t.insert("continue", control_flow::continue_cmd);

    t.insert("catch", catch_try::catch_cmd);
    t.insert("try", catch_try::try_cmd);

    t.insert("list", list_cmd::list_cmd);
    t.insert("lappend", list_cmd::lappend_cmd);
    t.insert("llength", list_cmd::llength_cmd);
    t.insert("lindex", list_cmd::lindex_cmd);
    t.insert("join", list_cmd::join_cmd);
    t.insert("split", list_cmd::split_cmd);
    t.insert("subst", list_cmd::subst_cmd);
    t.insert("eval", list_cmd::eval_cmd);
    t.insert("dict", list_cmd::dict_cmd);

    t.insert("coroutine", coroutine_cmd::coroutine_cmd);
    t.insert("yield", coroutine_cmd::yield_cmd);
    t.insert("yieldto", coroutine_cmd::yieldto_cmd);

    t.insert("incr", core::incr_cmd);
    t.insert("append", core::append_cmd);
    t.insert("error", core::error_cmd);
    t.insert("expr", core::expr_cmd);
    t.insert("rename", core::rename_cmd);
    t.insert("command", core::command_cmd);

    t
}
