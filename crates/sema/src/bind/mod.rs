//! The binding pass: syntax → sema, driving resolution as it goes.
//!
//! Bodies bind lazily: binding a block can resolve templates, which
//! instantiates symbols, which queues more bodies; the driver loops until
//! the queue runs dry. A function whose block is already bound (re-entered
//! through instantiation) is skipped.

mod expr;
mod ops;
mod stmt;

pub use expr::bind_expr;
pub use ops::{op_fn_return_type, resolve_binary_op_fn, resolve_unary_op_fn};
pub use stmt::{bind_block, bind_stmt};

use ace_error::{Diagnosed, DiagnosticBag};

use crate::cflow::{diagnose_invalid_control_flow, ControlFlowGraph};
use crate::compilation::Compilation;
use crate::compile::{FunctionBlockBinding, StaticVarBinding};
use crate::sema::{convert_expr, LowerCtx, Rewrite, StmtSema, TypeCheckCtx};
use crate::symbol::SymbolId;

/// What statement and expression binding need to know about where they
/// are.
pub struct BindCtx {
    pub function: SymbolId,
}

/// Bind all initial bodies, then everything the instantiation engine
/// queued, iterating to a fixed point.
pub fn bind_function_bodies(
    comp: &mut Compilation,
    initial: Vec<FunctionBlockBinding>,
) -> Diagnosed<()> {
    let mut bag = DiagnosticBag::new();
    let mut queue = initial;
    loop {
        if queue.is_empty() {
            queue = std::mem::take(&mut comp.pending_bindings);
        }
        if queue.is_empty() {
            break;
        }
        for binding in std::mem::take(&mut queue) {
            bind_one(comp, binding, &mut bag);
        }
    }
    Diagnosed::new((), bag)
}

fn bind_one(comp: &mut Compilation, binding: FunctionBlockBinding, bag: &mut DiagnosticBag) {
    let function = binding.function;
    let Some(data) = comp.symbol(function).as_function() else {
        return;
    };
    if data.body.is_some() {
        return;
    }
    let fn_scope = data.self_scope;
    let return_type = data.return_type;
    let name_location = comp.symbol(function).ident.location;

    let mut ctx = BindCtx { function };
    let block = bag.collect(bind_block(comp, fn_scope, &binding.block, &mut ctx));

    let check_ctx = TypeCheckCtx { return_type };
    let stmt = StmtSema::Block(block);
    let checked = bag.collect(stmt.create_type_checked(comp, &check_ctx));
    let lowered = lower_to_fixpoint(comp, checked, bag);

    let StmtSema::Block(block) = lowered else {
        unreachable!("lowering keeps the top-level block");
    };

    if let Some(data) = comp.symbol_mut(function).as_function_mut() {
        data.body = Some(block.clone());
    }

    let is_void =
        comp.types_equal(return_type, comp.natives.void) || comp.is_error_symbol(return_type);
    if !is_void {
        let graph = ControlFlowGraph::new(&block.create_control_flow_nodes());
        bag.collect(diagnose_invalid_control_flow(name_location, &graph));
    }
}

/// Run `create_lowered` until the node reports itself unchanged.
pub fn lower_to_fixpoint(
    comp: &mut Compilation,
    mut node: StmtSema,
    bag: &mut DiagnosticBag,
) -> StmtSema {
    loop {
        match bag.collect(node.create_lowered(comp, &LowerCtx)) {
            Rewrite::Unchanged => return node,
            Rewrite::Changed(next) => node = next,
        }
    }
}

/// Type-check the initializers of static variables against their declared
/// types.
pub fn bind_static_inits(comp: &mut Compilation, inits: Vec<StaticVarBinding>) -> Diagnosed<()> {
    let mut bag = DiagnosticBag::new();
    for init in inits {
        let Some(var_type) = comp.var_type(init.var) else {
            continue;
        };
        let mut ctx = BindCtx { function: init.var };
        let expr = bag.collect(bind_expr(comp, init.scope, &init.initializer, &mut ctx));
        let check_ctx = TypeCheckCtx {
            return_type: comp.natives.void,
        };
        let expr = bag.collect(expr.create_type_checked(comp, &check_ctx));
        let expr = convert_expr(comp, expr, var_type, &mut bag);
        comp.static_inits.push((init.var, expr));
    }
    Diagnosed::new((), bag)
}
