//! Deferred-value inference.
//!
//! Walks the script once in statement order, giving every expression a
//! descriptor from the registry and the symbol table. Along the way it
//! records:
//! - suspension sites: consumed calls and accesses that yield a deferred
//!   value
//! - promoted functions: user functions whose own body suspends
//!
//! Branches are walked from a snapshot of the entering state and joined
//! afterwards. Loops first run a throwaway walk to a fixed entry state, so
//! a binding widened on a later iteration is already widened on the first.

use std::mem;

use asyncify_parser::ast::expr::{
    ArrayExpr, AssignExpr, BinaryExpr, CallExpr, CondExpr, Expr, FnBody, FnLike, IndexExpr,
    LiteralKind, MemberExpr, ObjectExpr, ObjectMember, PrefixExpr, PropKey,
};
use asyncify_parser::ast::pat::{ParamList, Pat};
use asyncify_parser::ast::stmt::{
    Block, FnDecl, ForInStmt, ForInit, ForStmt, IfStmt, Stmt, SwitchStmt, TryStmt, VarDecl,
};
use asyncify_parser::ast::AstNode;
use asyncify_parser::{Parse, SyntaxKind, SyntaxNode};
use rowan::TextRange;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::env::SymbolTable;
use crate::error::RewriteError;
use crate::registry::Registry;
use crate::ty::Ty;

/// Everything the rewriter needs from inference.
#[derive(Debug, Clone)]
pub struct InferResult {
    /// Raw descriptor of every expression, before consumption.
    pub types: FxHashMap<TextRange, Ty>,
    /// Consumed deferred sites, in source order.
    pub suspensions: Vec<TextRange>,
    /// Functions that must be made `async`, in source order.
    pub promoted: Vec<TextRange>,
    /// Final state of the symbol table.
    pub symbols: SymbolTable,
}

impl InferResult {
    pub fn type_of(&self, range: TextRange) -> Option<&Ty> {
        self.types.get(&range)
    }

    pub fn is_suspended(&self, range: TextRange) -> bool {
        self.suspensions.binary_search_by(|r| cmp_ranges(r, &range)).is_ok()
    }

    pub fn is_promoted(&self, range: TextRange) -> bool {
        self.promoted.binary_search_by(|r| cmp_ranges(r, &range)).is_ok()
    }
}

/// Source order: by start, enclosing ranges first.
fn cmp_ranges(a: &TextRange, b: &TextRange) -> std::cmp::Ordering {
    a.start().cmp(&b.start()).then(b.end().cmp(&a.end()))
}

/// Infer descriptors for a parsed script.
///
/// Fails with the parse error if the script did not parse, or with the
/// first unsupported construct.
pub fn infer(parse: &Parse, registry: &Registry) -> Result<InferResult, RewriteError> {
    if let Some(err) = parse.errors().first() {
        return Err(RewriteError::from_parse(err));
    }

    let mut walker = Walker::new(registry);
    walker.stmt_list(parse.tree().stmts())?;

    let Walker {
        env,
        types,
        mut suspensions,
        mut promoted,
        ..
    } = walker;
    for ranges in [&mut suspensions, &mut promoted] {
        ranges.sort_by(cmp_ranges);
        ranges.dedup();
    }
    debug!(
        expressions = types.len(),
        suspensions = suspensions.len(),
        promoted = promoted.len(),
        "inference finished"
    );

    Ok(InferResult {
        types,
        suspensions,
        promoted,
        symbols: env,
    })
}

// ── Walker ─────────────────────────────────────────────────────────────

type InferOutcome<T> = Result<T, RewriteError>;

/// Per-function bookkeeping.
#[derive(Debug, Default)]
struct FnFrame {
    returns: Vec<Ty>,
    /// The function's own body holds a suspension.
    suspends: bool,
    /// Walking a parameter list, where `await` is not allowed.
    params: bool,
}

struct Walker<'r> {
    registry: &'r Registry,
    env: SymbolTable,
    /// Off during throwaway loop walks.
    record: bool,
    types: FxHashMap<TextRange, Ty>,
    suspensions: Vec<TextRange>,
    promoted: Vec<TextRange>,
    frames: Vec<FnFrame>,
}

impl<'r> Walker<'r> {
    fn new(registry: &'r Registry) -> Self {
        Walker {
            registry,
            env: SymbolTable::with_globals(registry),
            record: true,
            types: FxHashMap::default(),
            suspensions: Vec::new(),
            promoted: Vec::new(),
            frames: Vec::new(),
        }
    }

    fn record_type(&mut self, node: &SyntaxNode, ty: &Ty) {
        if !self.record {
            return;
        }
        let range = node.text_range();
        trace!(kind = ?node.kind(), ?range, ty = %ty, "descriptor");
        self.types.insert(range, ty.clone());
    }

    /// Mark `node` as a suspension site. Returns false inside a parameter
    /// list, where the deferred value is left as written.
    fn suspend(&mut self, node: &SyntaxNode) -> bool {
        if let Some(frame) = self.frames.last_mut() {
            if frame.params {
                trace!(range = ?node.text_range(), "deferred parameter default left as is");
                return false;
            }
            frame.suspends = true;
        }
        if self.record {
            trace!(range = ?node.text_range(), "suspension site");
            self.suspensions.push(node.text_range());
        }
        true
    }

    /// Run `f` inside a fresh scope, popping it on every path.
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> InferOutcome<T>) -> InferOutcome<T> {
        self.env.push_scope();
        let result = f(self);
        self.env.pop_scope();
        result
    }

    /// Walk one branch from `entry`, returning the state it leaves.
    fn branch(
        &mut self,
        entry: &SymbolTable,
        f: impl FnOnce(&mut Self) -> InferOutcome<()>,
    ) -> InferOutcome<SymbolTable> {
        self.env = entry.clone();
        f(self)?;
        Ok(mem::replace(&mut self.env, entry.clone()))
    }

    /// Reset to `entry` and merge the branch exits into it.
    fn join(&mut self, entry: SymbolTable, exits: &[SymbolTable]) {
        self.env = entry;
        self.env.join(exits);
    }

    /// Walk a loop: first to a fixed entry state without recording, then
    /// once for real. The exit state is joined with the entry state since
    /// the body may not run at all.
    fn walk_loop(&mut self, iteration: impl Fn(&mut Self) -> InferOutcome<()>) -> InferOutcome<()> {
        let record = mem::replace(&mut self.record, false);
        self.frames.push(FnFrame::default());
        let mut rounds = 0usize;
        let settled = loop {
            rounds += 1;
            let entry = self.env.clone();
            if let Err(err) = iteration(self) {
                break Err(err);
            }
            let exit = mem::replace(&mut self.env, entry.clone());
            self.env.join(&[entry.clone(), exit]);
            if self.env == entry {
                break Ok(());
            }
        };
        self.frames.pop();
        self.record = record;
        settled?;
        debug!(rounds, "loop entry state settled");

        let entry = self.env.clone();
        iteration(self)?;
        let exit = mem::replace(&mut self.env, entry.clone());
        self.env.join(&[entry, exit]);
        Ok(())
    }

    // ── Statements ─────────────────────────────────────────────────────

    fn stmt(&mut self, stmt: &Stmt) -> InferOutcome<()> {
        match stmt {
            Stmt::VarDecl(decl) => self.var_decl(decl),
            Stmt::FnDecl(decl) => {
                // Already bound by `hoist`; rebind with the state at this point.
                let ty = self.function(decl, None)?;
                if let Some(name) = decl.name() {
                    self.env.add(&name, ty);
                }
                Ok(())
            }
            Stmt::Block(block) => self.block(block),
            Stmt::Expr(stmt) => {
                if let Some(expr) = stmt.expr() {
                    self.consume(&expr)?;
                }
                Ok(())
            }
            Stmt::Empty(_) | Stmt::Break(_) | Stmt::Continue(_) => Ok(()),
            Stmt::Return(ret) => {
                if let Some(expr) = ret.expr() {
                    let ty = self.consume(&expr)?;
                    if let Some(frame) = self.frames.last_mut() {
                        frame.returns.push(ty);
                    }
                }
                Ok(())
            }
            Stmt::Throw(throw) => {
                if let Some(expr) = throw.expr() {
                    self.consume(&expr)?;
                }
                Ok(())
            }
            Stmt::If(stmt) => self.if_stmt(stmt),
            Stmt::While(stmt) => {
                self.walk_loop(|w| {
                    w.consume_opt(stmt.condition())?;
                    w.stmt_opt(stmt.body())
                })
            }
            Stmt::DoWhile(stmt) => {
                self.walk_loop(|w| {
                    w.stmt_opt(stmt.body())?;
                    w.consume_opt(stmt.condition())
                })
            }
            Stmt::For(stmt) => self.for_stmt(stmt),
            Stmt::ForIn(stmt) => self.for_in_stmt(stmt),
            Stmt::Try(stmt) => self.try_stmt(stmt),
            Stmt::Switch(stmt) => self.switch_stmt(stmt),
        }
    }

    fn stmt_opt(&mut self, stmt: Option<Stmt>) -> InferOutcome<()> {
        match stmt {
            Some(stmt) => self.stmt(&stmt),
            None => Ok(()),
        }
    }

    fn block(&mut self, block: &Block) -> InferOutcome<()> {
        self.scoped(|w| w.stmt_list(block.stmts()))
    }

    /// Walk a statement list after hoisting its function declarations.
    fn stmt_list(&mut self, stmts: impl Iterator<Item = Stmt>) -> InferOutcome<()> {
        let stmts: Vec<Stmt> = stmts.collect();
        self.hoist(&stmts);
        stmts.iter().try_for_each(|stmt| self.stmt(stmt))
    }

    /// Bind the function declarations of a statement list in the current
    /// scope before any of its statements run, so that earlier and
    /// recursive calls see the final descriptor.
    ///
    /// Declarations are walked without recording until their descriptors
    /// settle. Promotion travels one call per round, so `n` declarations
    /// settle within `n + 1` rounds. A declaration that fails to infer is
    /// left unbound here; the walk in statement order reports the error.
    fn hoist(&mut self, stmts: &[Stmt]) {
        let decls: Vec<(&FnDecl, String)> = stmts
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::FnDecl(decl) => decl.name().map(|name| (decl, name)),
                _ => None,
            })
            .collect();
        if decls.is_empty() {
            return;
        }

        let record = mem::replace(&mut self.record, false);
        let mut rounds = 0usize;
        loop {
            rounds += 1;
            let mut changed = false;
            for (decl, name) in &decls {
                let entry = self.env.clone();
                let walked = self.function(*decl, None);
                self.env = entry;
                if let Ok(ty) = walked {
                    if !self.env.is_bound(name) || self.env.lookup(name) != ty {
                        changed = true;
                    }
                    self.env.add(name, ty);
                }
            }
            if !changed || rounds > decls.len() {
                break;
            }
        }
        self.record = record;
        debug!(rounds, declarations = decls.len(), "function declarations hoisted");
    }

    fn var_decl(&mut self, decl: &VarDecl) -> InferOutcome<()> {
        for declarator in decl.declarators() {
            let Some(pattern) = declarator.pattern() else {
                continue;
            };
            match &pattern {
                Pat::Ident(ident) => {
                    let ty = match declarator.init() {
                        Some(init) => self.consume(&init)?,
                        None => Ty::Unknown,
                    };
                    if let Some(name) = ident.name() {
                        self.env.add(&name, ty);
                    }
                }
                _ => {
                    if let Some(init) = declarator.init() {
                        self.destructure_source(&init, pattern.syntax())?;
                    }
                    self.bind_pattern(&pattern)?;
                }
            }
        }
        Ok(())
    }

    /// Declare every name a pattern binds as `Unknown`, consuming its
    /// defaults and computed keys.
    fn bind_pattern(&mut self, pattern: &Pat) -> InferOutcome<()> {
        for expr in pattern.nested_exprs() {
            self.consume(&expr)?;
        }
        for name in pattern.bound_names() {
            self.env.add(&name, Ty::Unknown);
        }
        Ok(())
    }

    fn if_stmt(&mut self, stmt: &IfStmt) -> InferOutcome<()> {
        self.consume_opt(stmt.condition())?;
        let entry = self.env.clone();
        let then_exit = self.branch(&entry, |w| w.stmt_opt(stmt.then_branch()))?;
        let else_exit = match stmt.else_branch() {
            Some(else_branch) => self.branch(&entry, |w| w.stmt(&else_branch))?,
            None => entry.clone(),
        };
        self.join(entry, &[then_exit, else_exit]);
        Ok(())
    }

    fn switch_stmt(&mut self, stmt: &SwitchStmt) -> InferOutcome<()> {
        self.consume_opt(stmt.discriminant())?;
        self.scoped(|w| {
            let mut exits = Vec::new();
            let mut has_default = false;
            let cases: Vec<_> = stmt.cases().collect();
            let hoisted: Vec<Stmt> = cases.iter().flat_map(|case| case.stmts()).collect();
            w.hoist(&hoisted);
            for case in cases {
                w.consume_opt(case.test())?;
                has_default |= case.is_default();
                let entry = w.env.clone();
                exits.push(w.branch(&entry, |w| case.stmts().try_for_each(|s| w.stmt(&s)))?);
            }
            let entry = w.env.clone();
            if !has_default {
                exits.push(entry.clone());
            }
            w.join(entry, &exits);
            Ok(())
        })
    }

    fn try_stmt(&mut self, stmt: &TryStmt) -> InferOutcome<()> {
        let entry = self.env.clone();
        let mut exits = Vec::new();
        exits.push(self.branch(&entry, |w| match stmt.block() {
            Some(block) => w.block(&block),
            None => Ok(()),
        })?);
        match stmt.catch_clause() {
            Some(clause) => {
                exits.push(self.branch(&entry, |w| {
                    w.scoped(|w| {
                        if let Some(param) = clause.param() {
                            w.bind_pattern(&param)?;
                        }
                        match clause.body() {
                            Some(body) => w.stmt_list(body.stmts()),
                            None => Ok(()),
                        }
                    })
                })?);
            }
            None => exits.push(entry.clone()),
        }
        self.join(entry, &exits);

        match stmt.finally_block() {
            Some(block) => self.block(&block),
            None => Ok(()),
        }
    }

    fn for_stmt(&mut self, stmt: &ForStmt) -> InferOutcome<()> {
        self.scoped(|w| {
            match stmt.init() {
                Some(ForInit::Decl(decl)) => w.var_decl(&decl)?,
                Some(ForInit::Expr(expr)) => {
                    w.consume(&expr)?;
                }
                None => {}
            }
            w.walk_loop(|w| {
                w.consume_opt(stmt.test())?;
                w.stmt_opt(stmt.body())?;
                w.consume_opt(stmt.update())
            })
        })
    }

    fn for_in_stmt(&mut self, stmt: &ForInStmt) -> InferOutcome<()> {
        self.scoped(|w| {
            // `for (const { a } of [db])` destructures each element.
            match (stmt.iterable(), head_pattern(stmt)) {
                (Some(Expr::Array(array)), Some(pattern)) if stmt.is_of() => {
                    let (ty, shape) = w.array_expr(&array)?;
                    w.record_type(array.syntax(), &ty);
                    if let Some(shape) = shape {
                        return Err(RewriteError::DestructuringNotImplemented {
                            shape,
                            span: pattern.text_range(),
                        });
                    }
                }
                (iterable, _) => w.consume_opt(iterable)?,
            }
            w.walk_loop(|w| {
                match stmt.head() {
                    Some(ForInit::Decl(decl)) => {
                        for pattern in decl.declarators().filter_map(|d| d.pattern()) {
                            w.bind_pattern(&pattern)?;
                        }
                    }
                    Some(ForInit::Expr(target)) => w.assign_target(&target, Ty::Unknown)?,
                    None => {}
                }
                w.stmt_opt(stmt.body())
            })
        })
    }

    // ── Consumption ────────────────────────────────────────────────────

    /// Infer an expression whose value is used. A deferred call or access
    /// becomes a suspension site and yields its resolved descriptor.
    fn consume(&mut self, expr: &Expr) -> InferOutcome<Ty> {
        if let Expr::Paren(paren) = expr {
            let ty = match paren.expr() {
                Some(inner) => self.consume(&inner)?,
                None => Ty::Unknown,
            };
            self.record_type(expr.syntax(), &ty);
            return Ok(ty);
        }

        let ty = self.expr(expr)?;
        match (expr, ty) {
            (
                Expr::Call(_)
                | Expr::Member(_)
                | Expr::Index(_)
                | Expr::New(_)
                | Expr::TaggedTemplate(_),
                Ty::Deferred(inner),
            ) => {
                if self.suspend(expr.syntax()) {
                    Ok(*inner)
                } else {
                    Ok(Ty::Deferred(inner))
                }
            }
            (_, ty) => Ok(ty),
        }
    }

    fn consume_opt(&mut self, expr: Option<Expr>) -> InferOutcome<()> {
        if let Some(expr) = expr {
            self.consume(&expr)?;
        }
        Ok(())
    }

    /// Consume the source of a destructuring pattern, rejecting registry
    /// shapes, including shapes placed directly in an array or object
    /// literal.
    fn destructure_source(&mut self, source: &Expr, pattern: &SyntaxNode) -> InferOutcome<()> {
        let shape = match source {
            Expr::Array(array) => {
                let (ty, shape) = self.array_expr(array)?;
                self.record_type(source.syntax(), &ty);
                shape
            }
            Expr::Object(object) => {
                let (ty, shape) = self.object_expr(object)?;
                self.record_type(source.syntax(), &ty);
                shape
            }
            _ => self.consume(source)?.shape_name().map(str::to_string),
        };
        match shape {
            Some(shape) => Err(RewriteError::DestructuringNotImplemented {
                shape,
                span: pattern.text_range(),
            }),
            None => Ok(()),
        }
    }

    // ── Expressions ────────────────────────────────────────────────────

    /// Raw descriptor of an expression, recorded for its range.
    fn expr(&mut self, expr: &Expr) -> InferOutcome<Ty> {
        let ty = self.infer_expr(expr)?;
        self.record_type(expr.syntax(), &ty);
        Ok(ty)
    }

    fn infer_expr(&mut self, expr: &Expr) -> InferOutcome<Ty> {
        let ty = match expr {
            Expr::Literal(lit) => match lit.kind() {
                Some(LiteralKind::Number) => Ty::number(),
                Some(LiteralKind::String) => Ty::string(),
                Some(LiteralKind::Regex) => Ty::plain("regexp"),
                Some(LiteralKind::Boolean) => Ty::boolean(),
                Some(LiteralKind::Null) => Ty::plain("null"),
                None => Ty::Unknown,
            },
            Expr::Template(template) => {
                for part in template.interpolations() {
                    self.consume_opt(part.expr())?;
                }
                Ty::string()
            }
            Expr::TaggedTemplate(tagged) => {
                let tag = match tagged.tag() {
                    Some(tag) => self.consume(&tag)?,
                    None => Ty::Unknown,
                };
                if let Some(template) = tagged.template() {
                    for part in template.interpolations() {
                        self.consume_opt(part.expr())?;
                    }
                }
                match tag {
                    Ty::Callable(ret) => *ret,
                    _ => Ty::Unknown,
                }
            }
            Expr::NameRef(name) => match name.text() {
                Some(name) => self.env.lookup(&name),
                None => Ty::Unknown,
            },
            Expr::This(_) => Ty::Unknown,
            Expr::Array(array) => self.array_expr(array)?.0,
            Expr::Object(object) => self.object_expr(object)?.0,
            Expr::Spread(spread) => {
                self.consume_opt(spread.expr())?;
                Ty::Unknown
            }
            Expr::Fn(func) => {
                let name = func.name();
                self.function(func, name.as_deref())?
            }
            Expr::Arrow(arrow) => self.function(arrow, None)?,
            // Reached only from an explicit `await`; other positions consume.
            Expr::Paren(paren) => match paren.expr() {
                Some(inner) => self.expr(&inner)?,
                None => Ty::Unknown,
            },
            Expr::Member(member) => self.member_expr(member)?,
            Expr::Index(index) => self.index_expr(index)?,
            Expr::Call(call) => self.call_expr(call)?,
            Expr::New(new) => {
                self.consume_opt(new.callee())?;
                if let Some(args) = new.arg_list() {
                    for arg in args.args() {
                        self.consume(&arg)?;
                    }
                }
                Ty::Unknown
            }
            Expr::Prefix(prefix) => self.prefix_expr(prefix)?,
            Expr::Await(await_expr) => {
                // The operand is not consumed here: the source already
                // suspends on it.
                let inner = match await_expr.expr() {
                    Some(inner) => self.expr(&inner)?,
                    None => Ty::Unknown,
                };
                if let Some(frame) = self.frames.last_mut() {
                    frame.suspends = true;
                }
                inner.awaited()
            }
            Expr::Postfix(postfix) => {
                if let Some(operand) = postfix.operand() {
                    self.consume(&operand)?;
                    self.update_target(&operand);
                }
                Ty::number()
            }
            Expr::Binary(binary) => self.binary_expr(binary)?,
            Expr::Assign(assign) => self.assign_expr(assign)?,
            Expr::Cond(cond) => self.cond_expr(cond)?,
            Expr::Sequence(seq) => {
                let mut last = Ty::Unknown;
                for expr in seq.exprs() {
                    last = self.consume(&expr)?;
                }
                last
            }
        };
        Ok(ty)
    }

    /// `Plain(array)`, plus the first registry shape among the elements.
    fn array_expr(&mut self, array: &ArrayExpr) -> InferOutcome<(Ty, Option<String>)> {
        let mut shape = None;
        for element in array.elements() {
            let ty = self.consume(&element)?;
            if shape.is_none() && !matches!(element, Expr::Spread(_)) {
                shape = ty.shape_name().map(str::to_string);
            }
        }
        Ok((Ty::plain("array"), shape))
    }

    /// `Plain(object)`, plus the first registry shape among the values.
    fn object_expr(&mut self, object: &ObjectExpr) -> InferOutcome<(Ty, Option<String>)> {
        let mut shape = None;
        for member in object.members() {
            match member {
                ObjectMember::Property(prop) => {
                    if let Some(PropKey::Computed(key)) = prop.key() {
                        self.consume_opt(key.expr())?;
                    }
                    if let Some(value) = prop.value() {
                        let ty = self.consume(&value)?;
                        if shape.is_none() {
                            shape = ty.shape_name().map(str::to_string);
                        }
                    }
                }
                ObjectMember::Method(method) => {
                    if let Some(PropKey::Computed(key)) = method.key() {
                        self.consume_opt(key.expr())?;
                    }
                    self.function(&method, None)?;
                }
                ObjectMember::Spread(spread) => {
                    self.consume_opt(spread.expr())?;
                }
            }
        }
        Ok((Ty::plain("object"), shape))
    }

    fn member_expr(&mut self, member: &MemberExpr) -> InferOutcome<Ty> {
        let base = match member.object() {
            Some(object) => self.consume(&object)?,
            None => Ty::Unknown,
        };
        Ok(match (base.shape_name(), member.name()) {
            (Some(shape), Some(name)) => self.registry.member_type(shape, &name).1,
            _ => Ty::Unknown,
        })
    }

    fn index_expr(&mut self, index: &IndexExpr) -> InferOutcome<Ty> {
        let base = match index.object() {
            Some(object) => self.consume(&object)?,
            None => Ty::Unknown,
        };
        let key = match index.index() {
            Some(Expr::Literal(lit)) => {
                let key = lit.string_value();
                self.consume(&Expr::Literal(lit))?;
                key
            }
            Some(other) => {
                self.consume(&other)?;
                None
            }
            None => None,
        };
        Ok(match (base.shape_name(), key) {
            (Some(shape), Some(key)) => self.registry.member_type(shape, &key).1,
            _ => Ty::Unknown,
        })
    }

    fn call_expr(&mut self, call: &CallExpr) -> InferOutcome<Ty> {
        let callee = match call.callee() {
            Some(callee) => self.consume(&callee)?,
            None => Ty::Unknown,
        };
        for arg in call.args() {
            self.consume(&arg)?;
        }
        Ok(match callee {
            Ty::Callable(ret) => *ret,
            _ => Ty::Unknown,
        })
    }

    fn prefix_expr(&mut self, prefix: &PrefixExpr) -> InferOutcome<Ty> {
        let op = prefix.op().map(|t| t.kind());
        if let Some(operand) = prefix.operand() {
            self.consume(&operand)?;
            if matches!(op, Some(SyntaxKind::PLUS_PLUS | SyntaxKind::MINUS_MINUS)) {
                self.update_target(&operand);
            }
        }
        Ok(match op {
            Some(SyntaxKind::BANG | SyntaxKind::DELETE_KW) => Ty::boolean(),
            Some(SyntaxKind::TYPEOF_KW) => Ty::string(),
            Some(
                SyntaxKind::MINUS
                | SyntaxKind::PLUS
                | SyntaxKind::TILDE
                | SyntaxKind::PLUS_PLUS
                | SyntaxKind::MINUS_MINUS,
            ) => Ty::number(),
            _ => Ty::Unknown,
        })
    }

    /// `++x` / `x--` leave a number behind.
    fn update_target(&mut self, operand: &Expr) {
        if let Expr::NameRef(name) = operand {
            if let Some(name) = name.text() {
                self.env.assign(&name, Ty::number());
            }
        }
    }

    fn binary_expr(&mut self, binary: &BinaryExpr) -> InferOutcome<Ty> {
        let op = binary.op().map(|t| t.kind());
        let lhs = match binary.lhs() {
            Some(lhs) => self.consume(&lhs)?,
            None => Ty::Unknown,
        };

        if matches!(
            op,
            Some(SyntaxKind::AMP_AMP | SyntaxKind::PIPE_PIPE | SyntaxKind::QUESTION_QUESTION)
        ) {
            // The right operand may not run.
            let entry = self.env.clone();
            let mut rhs = Ty::Unknown;
            let exit = self.branch(&entry, |w| {
                rhs = match binary.rhs() {
                    Some(expr) => w.consume(&expr)?,
                    None => Ty::Unknown,
                };
                Ok(())
            })?;
            self.join(entry.clone(), &[exit, entry]);
            return Ok(Ty::common(&lhs, &rhs));
        }

        let rhs = match binary.rhs() {
            Some(rhs) => self.consume(&rhs)?,
            None => Ty::Unknown,
        };
        Ok(match op {
            Some(SyntaxKind::PLUS) => {
                if lhs == Ty::number() && rhs == Ty::number() {
                    Ty::number()
                } else if lhs == Ty::string() || rhs == Ty::string() {
                    Ty::string()
                } else {
                    Ty::Unknown
                }
            }
            Some(
                SyntaxKind::MINUS
                | SyntaxKind::STAR
                | SyntaxKind::STAR_STAR
                | SyntaxKind::SLASH
                | SyntaxKind::PERCENT
                | SyntaxKind::SHL
                | SyntaxKind::SHR
                | SyntaxKind::USHR
                | SyntaxKind::AMP
                | SyntaxKind::PIPE
                | SyntaxKind::CARET,
            ) => Ty::number(),
            Some(
                SyntaxKind::EQ_EQ
                | SyntaxKind::EQ_EQ_EQ
                | SyntaxKind::NOT_EQ
                | SyntaxKind::NOT_EQ_EQ
                | SyntaxKind::LT
                | SyntaxKind::GT
                | SyntaxKind::LT_EQ
                | SyntaxKind::GT_EQ
                | SyntaxKind::IN_KW
                | SyntaxKind::INSTANCEOF_KW,
            ) => Ty::boolean(),
            _ => Ty::Unknown,
        })
    }

    fn cond_expr(&mut self, cond: &CondExpr) -> InferOutcome<Ty> {
        self.consume_opt(cond.test())?;
        let entry = self.env.clone();
        let mut then_ty = Ty::Unknown;
        let mut else_ty = Ty::Unknown;
        let then_exit = self.branch(&entry, |w| {
            if let Some(expr) = cond.consequent() {
                then_ty = w.consume(&expr)?;
            }
            Ok(())
        })?;
        let else_exit = self.branch(&entry, |w| {
            if let Some(expr) = cond.alternate() {
                else_ty = w.consume(&expr)?;
            }
            Ok(())
        })?;
        self.join(entry, &[then_exit, else_exit]);
        Ok(Ty::common(&then_ty, &else_ty))
    }

    fn assign_expr(&mut self, assign: &AssignExpr) -> InferOutcome<Ty> {
        let Some(target) = assign.target() else {
            return Ok(Ty::Unknown);
        };
        let is_pattern = matches!(target, Expr::Array(_) | Expr::Object(_));

        // Bases of member targets are evaluated before the value.
        if !is_pattern {
            self.target_base(&target)?;
        }

        if is_pattern {
            if let Some(value) = assign.value() {
                self.destructure_source(&value, target.syntax())?;
            }
            self.assign_target(&target, Ty::Unknown)?;
            return Ok(Ty::Unknown);
        }

        let value = match assign.value() {
            Some(value) => self.consume(&value)?,
            None => Ty::Unknown,
        };
        if let Expr::NameRef(name) = &target {
            if let Some(name) = name.text() {
                let assigned = if assign.is_compound() {
                    Ty::Unknown
                } else {
                    value.clone()
                };
                self.env.assign(&name, assigned);
            }
        }
        Ok(if assign.is_compound() { Ty::Unknown } else { value })
    }

    /// Record a target's own range and consume the base of a member or
    /// index target.
    fn target_base(&mut self, target: &Expr) -> InferOutcome<()> {
        match target {
            Expr::Member(member) => {
                self.consume_opt(member.object())?;
                self.record_type(target.syntax(), &Ty::Unknown);
            }
            Expr::Index(index) => {
                self.consume_opt(index.object())?;
                self.consume_opt(index.index())?;
                self.record_type(target.syntax(), &Ty::Unknown);
            }
            Expr::NameRef(name) => {
                let current = name.text().map_or(Ty::Unknown, |n| self.env.lookup(&n));
                self.record_type(target.syntax(), &current);
            }
            Expr::Paren(paren) => {
                if let Some(inner) = paren.expr() {
                    self.target_base(&inner)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Assign `ty` to every name an assignment target binds. Array and
    /// object literals are treated as patterns.
    fn assign_target(&mut self, target: &Expr, ty: Ty) -> InferOutcome<()> {
        match target {
            Expr::NameRef(name) => {
                if let Some(name) = name.text() {
                    self.env.assign(&name, ty);
                }
            }
            Expr::Paren(paren) => {
                if let Some(inner) = paren.expr() {
                    self.assign_target(&inner, ty)?;
                }
            }
            Expr::Member(_) | Expr::Index(_) => self.target_base(target)?,
            Expr::Array(array) => {
                for element in array.elements() {
                    self.assign_target(&element, Ty::Unknown)?;
                }
            }
            Expr::Object(object) => {
                for member in object.members() {
                    match member {
                        ObjectMember::Property(prop) => {
                            if let Some(PropKey::Computed(key)) = prop.key() {
                                self.consume_opt(key.expr())?;
                            }
                            if let Some(value) = prop.value() {
                                self.assign_target(&value, Ty::Unknown)?;
                            }
                        }
                        ObjectMember::Spread(spread) => {
                            if let Some(inner) = spread.expr() {
                                self.assign_target(&inner, Ty::Unknown)?;
                            }
                        }
                        ObjectMember::Method(_) => {}
                    }
                }
            }
            Expr::Spread(spread) => {
                if let Some(inner) = spread.expr() {
                    self.assign_target(&inner, Ty::Unknown)?;
                }
            }
            // `[a = 1] = xs`: a default inside a pattern.
            Expr::Assign(inner) => {
                self.consume_opt(inner.value())?;
                if let Some(inner_target) = inner.target() {
                    self.assign_target(&inner_target, Ty::Unknown)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    // ── Functions ──────────────────────────────────────────────────────

    /// Walk a function body in its own scope and frame. `self_name` is the
    /// name a function expression binds inside itself.
    fn function<F: FnLike>(&mut self, func: &F, self_name: Option<&str>) -> InferOutcome<Ty> {
        self.frames.push(FnFrame::default());
        let walked = self.scoped(|w| {
            if let Some(name) = self_name {
                w.env.add(name, Ty::Unknown);
            }
            if let Some(params) = func.param_list() {
                w.params(&params)?;
            }
            match func.body() {
                Some(FnBody::Block(block)) => {
                    w.stmt_list(block.stmts())?;
                    Ok(None)
                }
                Some(FnBody::Expr(expr)) => w.consume(&expr).map(Some),
                None => Ok(None),
            }
        });
        let frame = self.frames.pop().expect("function frame was pushed");
        let body_ty = walked?;

        let ret = match body_ty {
            Some(ty) => ty,
            None => Ty::common_all(frame.returns.iter()),
        };
        if func.is_async() {
            return Ok(Ty::callable(Ty::Unknown));
        }
        if frame.suspends {
            if self.record {
                debug!(range = ?func.syntax().text_range(), "function promoted to async");
                self.promoted.push(func.syntax().text_range());
            }
            return Ok(Ty::callable(Ty::deferred(ret)));
        }
        Ok(Ty::callable(ret))
    }

    /// Bind the parameters as `Unknown`. Defaults are walked in their own
    /// frame that never suspends: `await` is not allowed in a parameter
    /// list, so a deferred default stays as written.
    fn params(&mut self, params: &ParamList) -> InferOutcome<()> {
        self.frames.push(FnFrame {
            params: true,
            ..FnFrame::default()
        });
        let walked = params.params().try_for_each(|param| {
            if let Some(default) = param.default() {
                self.consume(&default)?;
            }
            match param.pattern() {
                Some(pattern) => self.bind_pattern(&pattern),
                None => Ok(()),
            }
        });
        self.frames.pop();
        walked
    }
}

/// The destructuring pattern of a `for-in`/`for-of` head, if any.
fn head_pattern(stmt: &ForInStmt) -> Option<SyntaxNode> {
    match stmt.head()? {
        ForInit::Decl(decl) => decl
            .declarators()
            .filter_map(|d| d.pattern())
            .find(|pattern| !matches!(pattern, Pat::Ident(_)))
            .map(|pattern| pattern.syntax().clone()),
        ForInit::Expr(target @ (Expr::Array(_) | Expr::Object(_))) => Some(target.syntax().clone()),
        ForInit::Expr(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;

    fn registry() -> Registry {
        RegistryBuilder::new()
            .method("Collection", "find", true, "Cursor")
            .method("Collection", "toString", false, "string")
            .method("Cursor", "toArray", true, "unknown")
            .property("Database", "coll", false, "Collection")
            .global("db", "Database")
            .build()
            .expect("registry")
    }

    fn sites(source: &str) -> Vec<String> {
        let parse = asyncify_parser::parse(source);
        let result = infer(&parse, &registry()).expect("inference succeeds");
        result
            .suspensions
            .iter()
            .map(|range| source[std::ops::Range::<usize>::from(*range)].to_string())
            .collect()
    }

    #[test]
    fn consumed_deferred_call_is_a_site() {
        assert_eq!(sites("db.coll.find({})"), vec!["db.coll.find({})"]);
    }

    #[test]
    fn plain_member_is_not_a_site() {
        assert!(sites("db.coll.toString()").is_empty());
    }

    #[test]
    fn chained_sites_are_both_recorded() {
        assert_eq!(
            sites("db.coll.find().toArray()"),
            vec!["db.coll.find().toArray()", "db.coll.find()"]
        );
    }

    #[test]
    fn tagged_template_call_is_a_site() {
        assert_eq!(
            sites("db.coll.find`x`.toArray()"),
            vec!["db.coll.find`x`.toArray()", "db.coll.find`x`"]
        );
    }

    #[test]
    fn deferred_parameter_default_is_not_a_site() {
        assert!(sites("(a = db.coll.find()) => a").is_empty());
        assert_eq!(sites("(a = () => db.coll.find()) => a"), vec!["db.coll.find()"]);
    }

    #[test]
    fn explicit_await_is_left_alone() {
        assert!(sites("await db.coll.find()").is_empty());
        assert!(sites("await (db.coll.find())").is_empty());
    }

    #[test]
    fn raw_descriptor_is_recorded() {
        let source = "const c = db.coll.find()";
        let parse = asyncify_parser::parse(source);
        let result = infer(&parse, &registry()).expect("inference succeeds");
        let call = TextRange::new(10.into(), 24.into());
        assert_eq!(result.type_of(call), Some(&Ty::deferred(Ty::shape("Cursor"))));
        assert_eq!(result.symbols.lookup("c"), Ty::shape("Cursor"));
    }

    #[test]
    fn syntax_errors_stop_inference() {
        let parse = asyncify_parser::parse("f(");
        let err = infer(&parse, &registry()).unwrap_err();
        assert_eq!(err.code(), "P0001");
    }
}
