//! Statement binding: blocks get fresh scopes, local variables are
//! declared with their statement index (drop order), and structured
//! control flow binds its conditions and bodies.

use std::sync::Arc;

use ace_ast::{AccessModifier, BlockStmtSyntax, StmtSyntax};
use ace_error::{Diagnosed, DiagnosticBag};

use crate::bind::expr::bind_expr;
use crate::bind::ops::resolve_binary_op_fn;
use crate::bind::BindCtx;
use crate::compilation::Compilation;
use crate::resolve;
use crate::scope::ScopeId;
use crate::sema::{
    AssertStmtSema, AssignStmtSema, BlockStmtSema, CompoundAssignStmtSema, ExitStmtSema,
    ExprSema, ExprStmtSema, IfStmtSema, RetStmtSema, StmtSema, VarStmtSema, WhileStmtSema,
};
use crate::symbol::{LocalVarSymbol, Symbol, SymbolKind};

pub fn bind_block(
    comp: &mut Compilation,
    parent_scope: ScopeId,
    syntax: &Arc<BlockStmtSyntax>,
    ctx: &mut BindCtx,
) -> Diagnosed<Arc<BlockStmtSema>> {
    let mut bag = DiagnosticBag::new();
    let scope = comp.scopes.create_child(parent_scope, None);
    let mut stmts = Vec::with_capacity(syntax.stmts.len());
    for (index, stmt) in syntax.stmts.iter().enumerate() {
        stmts.push(bind_stmt_inner(comp, scope, stmt, index, ctx, &mut bag));
    }
    Diagnosed::new(
        Arc::new(BlockStmtSema {
            location: syntax.location,
            scope,
            stmts,
        }),
        bag,
    )
}

pub fn bind_stmt(
    comp: &mut Compilation,
    scope: ScopeId,
    syntax: &StmtSyntax,
    stmt_index: usize,
    ctx: &mut BindCtx,
) -> Diagnosed<StmtSema> {
    let mut bag = DiagnosticBag::new();
    let sema = bind_stmt_inner(comp, scope, syntax, stmt_index, ctx, &mut bag);
    Diagnosed::new(sema, bag)
}

fn bind_stmt_inner(
    comp: &mut Compilation,
    scope: ScopeId,
    syntax: &StmtSyntax,
    stmt_index: usize,
    ctx: &mut BindCtx,
    bag: &mut DiagnosticBag,
) -> StmtSema {
    match syntax {
        StmtSyntax::Block(block) => {
            let block = bag.collect(bind_block(comp, scope, block, ctx));
            StmtSema::Block(block)
        }

        StmtSyntax::Expr(stmt) => {
            let expr = bag.collect(bind_expr(comp, scope, &stmt.expr, ctx));
            StmtSema::Expr(Arc::new(ExprStmtSema {
                location: stmt.location,
                expr,
            }))
        }

        StmtSyntax::Var(stmt) => {
            let var_type = resolve::resolve_type_or_error(comp, scope, &stmt.type_name, bag);
            let declared = comp.declare_symbol(Symbol {
                ident: stmt.name.clone(),
                scope,
                access: AccessModifier::Private,
                kind: SymbolKind::LocalVar(LocalVarSymbol {
                    var_type,
                    stmt_index,
                }),
                is_error: false,
            });
            let var = bag
                .collect_opt(declared)
                .unwrap_or(comp.error_symbols.error_var);
            let initializer = stmt
                .initializer
                .as_ref()
                .map(|init| bag.collect(bind_expr(comp, scope, init, ctx)));
            StmtSema::Var(Arc::new(VarStmtSema {
                location: stmt.location,
                var,
                initializer,
            }))
        }

        StmtSyntax::Assignment(stmt) => {
            let lhs = bag.collect(bind_expr(comp, scope, &stmt.lhs, ctx));
            let rhs = bag.collect(bind_expr(comp, scope, &stmt.rhs, ctx));
            StmtSema::Assign(Arc::new(AssignStmtSema {
                location: stmt.location,
                lhs,
                rhs,
            }))
        }

        StmtSyntax::CompoundAssignment(stmt) => {
            let lhs = bag.collect(bind_expr(comp, scope, &stmt.lhs, ctx));
            let rhs = bag.collect(bind_expr(comp, scope, &stmt.rhs, ctx));
            let op_fn = resolve_binary_op_fn(
                comp,
                &stmt.op,
                lhs.type_info().ty,
                rhs.type_info().ty,
                bag,
            );
            StmtSema::CompoundAssign(Arc::new(CompoundAssignStmtSema {
                location: stmt.location,
                op: stmt.op,
                op_fn,
                lhs,
                rhs,
            }))
        }

        StmtSyntax::If(stmt) => {
            let conditions: Vec<ExprSema> = stmt
                .conditions
                .iter()
                .map(|condition| bag.collect(bind_expr(comp, scope, condition, ctx)))
                .collect();
            let bodies: Vec<StmtSema> = stmt
                .bodies
                .iter()
                .map(|body| StmtSema::Block(bag.collect(bind_block(comp, scope, body, ctx))))
                .collect();
            StmtSema::If(Arc::new(IfStmtSema {
                location: stmt.location,
                scope,
                conditions,
                bodies,
            }))
        }

        StmtSyntax::While(stmt) => {
            let condition = bag.collect(bind_expr(comp, scope, &stmt.condition, ctx));
            let body = StmtSema::Block(bag.collect(bind_block(comp, scope, &stmt.body, ctx)));
            StmtSema::While(Arc::new(WhileStmtSema {
                location: stmt.location,
                scope,
                condition,
                body,
            }))
        }

        StmtSyntax::Ret(stmt) => {
            let expr = stmt
                .expr
                .as_ref()
                .map(|expr| bag.collect(bind_expr(comp, scope, expr, ctx)));
            StmtSema::Ret(Arc::new(RetStmtSema {
                location: stmt.location,
                expr,
            }))
        }

        StmtSyntax::Exit(stmt) => StmtSema::Exit(Arc::new(ExitStmtSema {
            location: stmt.location,
        })),

        StmtSyntax::Assert(stmt) => {
            let condition = bag.collect(bind_expr(comp, scope, &stmt.condition, ctx));
            StmtSema::Assert(Arc::new(AssertStmtSema {
                location: stmt.location,
                scope,
                condition,
            }))
        }
    }
}
