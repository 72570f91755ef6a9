//! Statement semas and the structured-to-jump lowering: `while`, `if`
//! chains and `assert` all lower to labels and conditional jumps, so the
//! control-flow analysis only ever sees straight-line statements, jumps
//! and returns.

use std::sync::Arc;

use ace_ast::Op;
use ace_error::{Diagnosed, DiagnosticBag};
use ace_span::SrcLocation;

use crate::cflow::ControlFlowNode;
use crate::compilation::Compilation;
use crate::scope::ScopeId;
use crate::sema::{convert_expr, ExprSema, LowerCtx, Rewrite, TypeCheckCtx};
use crate::symbol::SymbolId;

#[derive(Debug, Clone, PartialEq)]
pub enum StmtSema {
    Block(Arc<BlockStmtSema>),
    Expr(Arc<ExprStmtSema>),
    Var(Arc<VarStmtSema>),
    Assign(Arc<AssignStmtSema>),
    CompoundAssign(Arc<CompoundAssignStmtSema>),
    If(Arc<IfStmtSema>),
    While(Arc<WhileStmtSema>),
    Ret(Arc<RetStmtSema>),
    Exit(Arc<ExitStmtSema>),
    Assert(Arc<AssertStmtSema>),
    Label(Arc<LabelStmtSema>),
    Jump(Arc<JumpStmtSema>),
    CondJump(Arc<CondJumpStmtSema>),
    Group(Arc<GroupStmtSema>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmtSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub stmts: Vec<StmtSema>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmtSema {
    pub location: SrcLocation,
    pub expr: ExprSema,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarStmtSema {
    pub location: SrcLocation,
    pub var: SymbolId,
    pub initializer: Option<ExprSema>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmtSema {
    pub location: SrcLocation,
    pub lhs: ExprSema,
    pub rhs: ExprSema,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompoundAssignStmtSema {
    pub location: SrcLocation,
    pub op: Op,
    pub op_fn: SymbolId,
    pub lhs: ExprSema,
    pub rhs: ExprSema,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmtSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub conditions: Vec<ExprSema>,
    /// One body per condition, plus a trailing `else` body when present.
    pub bodies: Vec<StmtSema>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmtSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub condition: ExprSema,
    pub body: StmtSema,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetStmtSema {
    pub location: SrcLocation,
    pub expr: Option<ExprSema>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExitStmtSema {
    pub location: SrcLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssertStmtSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub condition: ExprSema,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStmtSema {
    pub location: SrcLocation,
    pub label: SymbolId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JumpStmtSema {
    pub location: SrcLocation,
    pub target: SymbolId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CondJumpStmtSema {
    pub location: SrcLocation,
    pub condition: ExprSema,
    pub target: SymbolId,
    /// Jump when the condition is this value.
    pub jump_if: bool,
}

/// A flat statement sequence introduced by lowering; no scope of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStmtSema {
    pub location: SrcLocation,
    pub stmts: Vec<StmtSema>,
}

impl StmtSema {
    pub fn location(&self) -> SrcLocation {
        match self {
            StmtSema::Block(stmt) => stmt.location,
            StmtSema::Expr(stmt) => stmt.location,
            StmtSema::Var(stmt) => stmt.location,
            StmtSema::Assign(stmt) => stmt.location,
            StmtSema::CompoundAssign(stmt) => stmt.location,
            StmtSema::If(stmt) => stmt.location,
            StmtSema::While(stmt) => stmt.location,
            StmtSema::Ret(stmt) => stmt.location,
            StmtSema::Exit(stmt) => stmt.location,
            StmtSema::Assert(stmt) => stmt.location,
            StmtSema::Label(stmt) => stmt.location,
            StmtSema::Jump(stmt) => stmt.location,
            StmtSema::CondJump(stmt) => stmt.location,
            StmtSema::Group(stmt) => stmt.location,
        }
    }

    pub fn create_type_checked(
        &self,
        comp: &mut Compilation,
        ctx: &TypeCheckCtx,
    ) -> Diagnosed<StmtSema> {
        let mut bag = DiagnosticBag::new();
        let bool_ = comp.natives.bool_;
        let checked = match self {
            StmtSema::Block(stmt) => {
                let mut changed = false;
                let mut stmts = Vec::with_capacity(stmt.stmts.len());
                for child in &stmt.stmts {
                    let checked = bag.collect(child.create_type_checked(comp, ctx));
                    changed |= checked != *child;
                    stmts.push(checked);
                }
                if changed {
                    StmtSema::Block(Arc::new(BlockStmtSema {
                        stmts,
                        ..(**stmt).clone()
                    }))
                } else {
                    self.clone()
                }
            }
            StmtSema::Group(stmt) => {
                let mut changed = false;
                let mut stmts = Vec::with_capacity(stmt.stmts.len());
                for child in &stmt.stmts {
                    let checked = bag.collect(child.create_type_checked(comp, ctx));
                    changed |= checked != *child;
                    stmts.push(checked);
                }
                if changed {
                    StmtSema::Group(Arc::new(GroupStmtSema {
                        stmts,
                        ..(**stmt).clone()
                    }))
                } else {
                    self.clone()
                }
            }
            StmtSema::Expr(stmt) => {
                let expr = bag.collect(stmt.expr.create_type_checked(comp, ctx));
                if expr == stmt.expr {
                    self.clone()
                } else {
                    StmtSema::Expr(Arc::new(ExprStmtSema {
                        expr,
                        ..(**stmt).clone()
                    }))
                }
            }
            StmtSema::Var(stmt) => {
                let Some(initializer) = &stmt.initializer else {
                    return Diagnosed::new(self.clone(), bag);
                };
                let target = comp.var_type(stmt.var).unwrap_or(comp.error_symbols.error_type);
                let value = bag.collect(initializer.create_type_checked(comp, ctx));
                let value = convert_expr(comp, value, target, &mut bag);
                if value == *initializer {
                    self.clone()
                } else {
                    StmtSema::Var(Arc::new(VarStmtSema {
                        initializer: Some(value),
                        ..(**stmt).clone()
                    }))
                }
            }
            StmtSema::Assign(stmt) => {
                let lhs = bag.collect(stmt.lhs.create_type_checked(comp, ctx));
                let rhs = bag.collect(stmt.rhs.create_type_checked(comp, ctx));
                let rhs = convert_expr(comp, rhs, lhs.type_info().ty, &mut bag);
                if lhs == stmt.lhs && rhs == stmt.rhs {
                    self.clone()
                } else {
                    StmtSema::Assign(Arc::new(AssignStmtSema {
                        lhs,
                        rhs,
                        ..(**stmt).clone()
                    }))
                }
            }
            StmtSema::CompoundAssign(stmt) => {
                let lhs = bag.collect(stmt.lhs.create_type_checked(comp, ctx));
                let rhs = bag.collect(stmt.rhs.create_type_checked(comp, ctx));
                if lhs == stmt.lhs && rhs == stmt.rhs {
                    self.clone()
                } else {
                    StmtSema::CompoundAssign(Arc::new(CompoundAssignStmtSema {
                        lhs,
                        rhs,
                        ..(**stmt).clone()
                    }))
                }
            }
            StmtSema::If(stmt) => {
                let mut changed = false;
                let mut conditions = Vec::with_capacity(stmt.conditions.len());
                for condition in &stmt.conditions {
                    let checked = bag.collect(condition.create_type_checked(comp, ctx));
                    let checked = convert_expr(comp, checked, bool_, &mut bag);
                    changed |= checked != *condition;
                    conditions.push(checked);
                }
                let mut bodies = Vec::with_capacity(stmt.bodies.len());
                for body in &stmt.bodies {
                    let checked = bag.collect(body.create_type_checked(comp, ctx));
                    changed |= checked != *body;
                    bodies.push(checked);
                }
                if changed {
                    StmtSema::If(Arc::new(IfStmtSema {
                        conditions,
                        bodies,
                        ..(**stmt).clone()
                    }))
                } else {
                    self.clone()
                }
            }
            StmtSema::While(stmt) => {
                let condition = bag.collect(stmt.condition.create_type_checked(comp, ctx));
                let condition = convert_expr(comp, condition, bool_, &mut bag);
                let body = bag.collect(stmt.body.create_type_checked(comp, ctx));
                if condition == stmt.condition && body == stmt.body {
                    self.clone()
                } else {
                    StmtSema::While(Arc::new(WhileStmtSema {
                        condition,
                        body,
                        ..(**stmt).clone()
                    }))
                }
            }
            StmtSema::Ret(stmt) => {
                let void = comp.natives.void;
                match &stmt.expr {
                    Some(expr) => {
                        let value = bag.collect(expr.create_type_checked(comp, ctx));
                        let value = convert_expr(comp, value, ctx.return_type, &mut bag);
                        if value == *expr {
                            self.clone()
                        } else {
                            StmtSema::Ret(Arc::new(RetStmtSema {
                                expr: Some(value),
                                ..(**stmt).clone()
                            }))
                        }
                    }
                    None => {
                        if !comp.types_equal(ctx.return_type, void)
                            && !comp.is_error_symbol(ctx.return_type)
                        {
                            bag.add(crate::diagnostics::mismatched_type_error(
                                comp,
                                stmt.location,
                                ctx.return_type,
                                void,
                            ));
                        }
                        self.clone()
                    }
                }
            }
            StmtSema::Assert(stmt) => {
                let condition = bag.collect(stmt.condition.create_type_checked(comp, ctx));
                let condition = convert_expr(comp, condition, bool_, &mut bag);
                if condition == stmt.condition {
                    self.clone()
                } else {
                    StmtSema::Assert(Arc::new(AssertStmtSema {
                        condition,
                        ..(**stmt).clone()
                    }))
                }
            }
            StmtSema::CondJump(stmt) => {
                let condition = bag.collect(stmt.condition.create_type_checked(comp, ctx));
                let condition = convert_expr(comp, condition, bool_, &mut bag);
                if condition == stmt.condition {
                    self.clone()
                } else {
                    StmtSema::CondJump(Arc::new(CondJumpStmtSema {
                        condition,
                        ..(**stmt).clone()
                    }))
                }
            }
            StmtSema::Exit(_) | StmtSema::Label(_) | StmtSema::Jump(_) => self.clone(),
        };
        Diagnosed::new(checked, bag)
    }

    /// One lowering step. Structured control flow disappears into labels
    /// and jumps; compound assignments become plain assignments over their
    /// op function; already-lowered nodes answer `Unchanged`.
    pub fn create_lowered(
        &self,
        comp: &mut Compilation,
        ctx: &LowerCtx,
    ) -> Diagnosed<Rewrite<StmtSema>> {
        let mut bag = DiagnosticBag::new();
        let rewrite = match self {
            StmtSema::Block(stmt) => {
                let mut changed = false;
                let mut stmts = Vec::with_capacity(stmt.stmts.len());
                for child in &stmt.stmts {
                    let lowered = bag.collect(child.create_lowered(comp, ctx));
                    changed |= lowered.is_changed();
                    stmts.push(lowered.into_node(child));
                }
                if changed {
                    Rewrite::Changed(StmtSema::Block(Arc::new(BlockStmtSema {
                        stmts,
                        ..(**stmt).clone()
                    })))
                } else {
                    Rewrite::Unchanged
                }
            }
            StmtSema::Group(stmt) => {
                let mut changed = false;
                let mut stmts = Vec::with_capacity(stmt.stmts.len());
                for child in &stmt.stmts {
                    let lowered = bag.collect(child.create_lowered(comp, ctx));
                    changed |= lowered.is_changed();
                    stmts.push(lowered.into_node(child));
                }
                if changed {
                    Rewrite::Changed(StmtSema::Group(Arc::new(GroupStmtSema {
                        stmts,
                        ..(**stmt).clone()
                    })))
                } else {
                    Rewrite::Unchanged
                }
            }
            StmtSema::Expr(stmt) => {
                let lowered = bag.collect(stmt.expr.create_lowered(comp, ctx));
                if lowered.is_changed() {
                    Rewrite::Changed(StmtSema::Expr(Arc::new(ExprStmtSema {
                        expr: lowered.into_node(&stmt.expr),
                        ..(**stmt).clone()
                    })))
                } else {
                    Rewrite::Unchanged
                }
            }
            StmtSema::Var(stmt) => match &stmt.initializer {
                Some(initializer) => {
                    let lowered = bag.collect(initializer.create_lowered(comp, ctx));
                    if lowered.is_changed() {
                        Rewrite::Changed(StmtSema::Var(Arc::new(VarStmtSema {
                            initializer: Some(lowered.into_node(initializer)),
                            ..(**stmt).clone()
                        })))
                    } else {
                        Rewrite::Unchanged
                    }
                }
                None => Rewrite::Unchanged,
            },
            StmtSema::Assign(stmt) => {
                let lhs = bag.collect(stmt.lhs.create_lowered(comp, ctx));
                let rhs = bag.collect(stmt.rhs.create_lowered(comp, ctx));
                if lhs.is_changed() || rhs.is_changed() {
                    Rewrite::Changed(StmtSema::Assign(Arc::new(AssignStmtSema {
                        lhs: lhs.into_node(&stmt.lhs),
                        rhs: rhs.into_node(&stmt.rhs),
                        ..(**stmt).clone()
                    })))
                } else {
                    Rewrite::Unchanged
                }
            }

            // `a += b` → `a = a.op_add(b)`.
            StmtSema::CompoundAssign(stmt) => {
                let lhs = lower_node_expr(comp, ctx, &stmt.lhs, &mut bag);
                let rhs = lower_node_expr(comp, ctx, &stmt.rhs, &mut bag);
                let result_ty = crate::bind::op_fn_return_type(comp, stmt.op_fn);
                let call = ExprSema::Call(Arc::new(crate::sema::CallExprSema {
                    location: stmt.location,
                    scope: lhs.scope(),
                    function: stmt.op_fn,
                    args: vec![lhs.clone(), rhs],
                    ty: crate::ty::TypeInfo::rvalue(result_ty),
                }));
                Rewrite::Changed(StmtSema::Assign(Arc::new(AssignStmtSema {
                    location: stmt.location,
                    lhs,
                    rhs: call,
                })))
            }

            // An if-chain becomes conditional jumps over its bodies.
            StmtSema::If(stmt) => {
                let mut stmts = Vec::new();
                let end = comp.fresh_label(stmt.scope);
                let has_else = stmt.bodies.len() > stmt.conditions.len();
                for (index, condition) in stmt.conditions.iter().enumerate() {
                    let condition = lower_node_expr(comp, ctx, condition, &mut bag);
                    let next = comp.fresh_label(stmt.scope);
                    stmts.push(StmtSema::CondJump(Arc::new(CondJumpStmtSema {
                        location: condition.location(),
                        condition,
                        target: next,
                        jump_if: false,
                    })));
                    let body = lower_node(comp, ctx, &stmt.bodies[index], &mut bag);
                    stmts.push(body);
                    stmts.push(StmtSema::Jump(Arc::new(JumpStmtSema {
                        location: stmt.location,
                        target: end,
                    })));
                    stmts.push(StmtSema::Label(Arc::new(LabelStmtSema {
                        location: stmt.location,
                        label: next,
                    })));
                }
                if has_else {
                    let body =
                        lower_node(comp, ctx, stmt.bodies.last().expect("else body"), &mut bag);
                    stmts.push(body);
                }
                stmts.push(StmtSema::Label(Arc::new(LabelStmtSema {
                    location: stmt.location,
                    label: end,
                })));
                Rewrite::Changed(StmtSema::Group(Arc::new(GroupStmtSema {
                    location: stmt.location,
                    stmts,
                })))
            }

            // `while cond { body }` becomes a begin label, an exit branch,
            // the body, and a back jump.
            StmtSema::While(stmt) => {
                let begin = comp.fresh_label(stmt.scope);
                let end = comp.fresh_label(stmt.scope);
                let condition = lower_node_expr(comp, ctx, &stmt.condition, &mut bag);
                let body = lower_node(comp, ctx, &stmt.body, &mut bag);
                let stmts = vec![
                    StmtSema::Label(Arc::new(LabelStmtSema {
                        location: stmt.location,
                        label: begin,
                    })),
                    StmtSema::CondJump(Arc::new(CondJumpStmtSema {
                        location: condition.location(),
                        condition,
                        target: end,
                        jump_if: false,
                    })),
                    body,
                    StmtSema::Jump(Arc::new(JumpStmtSema {
                        location: stmt.location,
                        target: begin,
                    })),
                    StmtSema::Label(Arc::new(LabelStmtSema {
                        location: stmt.location,
                        label: end,
                    })),
                ];
                Rewrite::Changed(StmtSema::Group(Arc::new(GroupStmtSema {
                    location: stmt.location,
                    stmts,
                })))
            }

            // `assert cond` → skip the exit when the condition holds.
            StmtSema::Assert(stmt) => {
                let ok = comp.fresh_label(stmt.scope);
                let condition = lower_node_expr(comp, ctx, &stmt.condition, &mut bag);
                let stmts = vec![
                    StmtSema::CondJump(Arc::new(CondJumpStmtSema {
                        location: condition.location(),
                        condition,
                        target: ok,
                        jump_if: true,
                    })),
                    StmtSema::Exit(Arc::new(ExitStmtSema {
                        location: stmt.location,
                    })),
                    StmtSema::Label(Arc::new(LabelStmtSema {
                        location: stmt.location,
                        label: ok,
                    })),
                ];
                Rewrite::Changed(StmtSema::Group(Arc::new(GroupStmtSema {
                    location: stmt.location,
                    stmts,
                })))
            }

            StmtSema::Ret(stmt) => match &stmt.expr {
                Some(expr) => {
                    let lowered = bag.collect(expr.create_lowered(comp, ctx));
                    if lowered.is_changed() {
                        Rewrite::Changed(StmtSema::Ret(Arc::new(RetStmtSema {
                            expr: Some(lowered.into_node(expr)),
                            ..(**stmt).clone()
                        })))
                    } else {
                        Rewrite::Unchanged
                    }
                }
                None => Rewrite::Unchanged,
            },
            StmtSema::CondJump(stmt) => {
                let lowered = bag.collect(stmt.condition.create_lowered(comp, ctx));
                if lowered.is_changed() {
                    Rewrite::Changed(StmtSema::CondJump(Arc::new(CondJumpStmtSema {
                        condition: lowered.into_node(&stmt.condition),
                        ..(**stmt).clone()
                    })))
                } else {
                    Rewrite::Unchanged
                }
            }
            StmtSema::Exit(_) | StmtSema::Label(_) | StmtSema::Jump(_) => Rewrite::Unchanged,
        };
        Diagnosed::new(rewrite, bag)
    }

    /// Flatten into abstract control-flow nodes; blocks and groups
    /// disappear, everything else becomes one node.
    pub fn collect_control_flow_nodes(&self, nodes: &mut Vec<ControlFlowNode>) {
        match self {
            StmtSema::Block(stmt) => {
                for child in &stmt.stmts {
                    child.collect_control_flow_nodes(nodes);
                }
            }
            StmtSema::Group(stmt) => {
                for child in &stmt.stmts {
                    child.collect_control_flow_nodes(nodes);
                }
            }
            StmtSema::Label(stmt) => nodes.push(ControlFlowNode::Label(stmt.label)),
            StmtSema::Jump(stmt) => nodes.push(ControlFlowNode::Jump(stmt.target)),
            StmtSema::CondJump(stmt) => nodes.push(ControlFlowNode::Branch(stmt.target)),
            StmtSema::Ret(_) => nodes.push(ControlFlowNode::Ret),
            StmtSema::Exit(_) => nodes.push(ControlFlowNode::Exit),
            _ => nodes.push(ControlFlowNode::Normal),
        }
    }
}

impl BlockStmtSema {
    pub fn create_control_flow_nodes(&self) -> Vec<ControlFlowNode> {
        let mut nodes = Vec::new();
        for stmt in &self.stmts {
            stmt.collect_control_flow_nodes(&mut nodes);
        }
        nodes
    }
}

fn lower_node(
    comp: &mut Compilation,
    ctx: &LowerCtx,
    stmt: &StmtSema,
    bag: &mut DiagnosticBag,
) -> StmtSema {
    bag.collect(stmt.create_lowered(comp, ctx)).into_node(stmt)
}

fn lower_node_expr(
    comp: &mut Compilation,
    ctx: &LowerCtx,
    expr: &ExprSema,
    bag: &mut DiagnosticBag,
) -> ExprSema {
    bag.collect(expr.create_lowered(comp, ctx)).into_node(expr)
}
