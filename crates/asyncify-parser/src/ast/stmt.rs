//! Typed AST nodes for statements and the source file root.

use crate::ast::expr::{function_name, Expr, FnLike};
use crate::ast::pat::Pat;
use crate::ast::{ast_node, child_node, child_nodes, child_token, AstNode};
use crate::cst::SyntaxNode;
use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stmt {
    VarDecl(VarDecl),
    FnDecl(FnDecl),
    Block(Block),
    Expr(ExprStmt),
    Empty(EmptyStmt),
    Return(ReturnStmt),
    If(IfStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    For(ForStmt),
    ForIn(ForInStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Throw(ThrowStmt),
    Try(TryStmt),
    Switch(SwitchStmt),
}

impl Stmt {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        let stmt = match node.kind() {
            SyntaxKind::VAR_DECL => Stmt::VarDecl(VarDecl { syntax: node }),
            SyntaxKind::FN_DECL => Stmt::FnDecl(FnDecl { syntax: node }),
            SyntaxKind::BLOCK => Stmt::Block(Block { syntax: node }),
            SyntaxKind::EXPR_STMT => Stmt::Expr(ExprStmt { syntax: node }),
            SyntaxKind::EMPTY_STMT => Stmt::Empty(EmptyStmt { syntax: node }),
            SyntaxKind::RETURN_STMT => Stmt::Return(ReturnStmt { syntax: node }),
            SyntaxKind::IF_STMT => Stmt::If(IfStmt { syntax: node }),
            SyntaxKind::WHILE_STMT => Stmt::While(WhileStmt { syntax: node }),
            SyntaxKind::DO_WHILE_STMT => Stmt::DoWhile(DoWhileStmt { syntax: node }),
            SyntaxKind::FOR_STMT => Stmt::For(ForStmt { syntax: node }),
            SyntaxKind::FOR_IN_STMT => Stmt::ForIn(ForInStmt { syntax: node }),
            SyntaxKind::BREAK_STMT => Stmt::Break(BreakStmt { syntax: node }),
            SyntaxKind::CONTINUE_STMT => Stmt::Continue(ContinueStmt { syntax: node }),
            SyntaxKind::THROW_STMT => Stmt::Throw(ThrowStmt { syntax: node }),
            SyntaxKind::TRY_STMT => Stmt::Try(TryStmt { syntax: node }),
            SyntaxKind::SWITCH_STMT => Stmt::Switch(SwitchStmt { syntax: node }),
            _ => return None,
        };
        Some(stmt)
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Stmt::VarDecl(n) => &n.syntax,
            Stmt::FnDecl(n) => &n.syntax,
            Stmt::Block(n) => &n.syntax,
            Stmt::Expr(n) => &n.syntax,
            Stmt::Empty(n) => &n.syntax,
            Stmt::Return(n) => &n.syntax,
            Stmt::If(n) => &n.syntax,
            Stmt::While(n) => &n.syntax,
            Stmt::DoWhile(n) => &n.syntax,
            Stmt::For(n) => &n.syntax,
            Stmt::ForIn(n) => &n.syntax,
            Stmt::Break(n) => &n.syntax,
            Stmt::Continue(n) => &n.syntax,
            Stmt::Throw(n) => &n.syntax,
            Stmt::Try(n) => &n.syntax,
            Stmt::Switch(n) => &n.syntax,
        }
    }
}

fn first_expr(node: &SyntaxNode) -> Option<Expr> {
    node.children().find_map(Expr::cast)
}

fn first_stmt(node: &SyntaxNode) -> Option<Stmt> {
    node.children().find_map(Stmt::cast)
}

/// First statement after the `)` closing a statement head.
fn body_after_head(node: &SyntaxNode) -> Option<Stmt> {
    node.children_with_tokens()
        .skip_while(|it| it.kind() != SyntaxKind::R_PAREN)
        .filter_map(|it| it.into_node())
        .find_map(Stmt::cast)
}

// ── Root ───────────────────────────────────────────────────────────────

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    pub fn stmts(&self) -> impl Iterator<Item = Stmt> + '_ {
        self.syntax.children().filter_map(Stmt::cast)
    }
}

ast_node!(Block, BLOCK);

impl Block {
    pub fn stmts(&self) -> impl Iterator<Item = Stmt> + '_ {
        self.syntax.children().filter_map(Stmt::cast)
    }
}

// ── Declarations ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

ast_node!(VarDecl, VAR_DECL);

impl VarDecl {
    pub fn kind(&self) -> Option<DeclKind> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find_map(|t| match t.kind() {
                SyntaxKind::VAR_KW => Some(DeclKind::Var),
                SyntaxKind::LET_KW => Some(DeclKind::Let),
                SyntaxKind::CONST_KW => Some(DeclKind::Const),
                _ => None,
            })
    }

    pub fn declarators(&self) -> impl Iterator<Item = Declarator> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(Declarator, DECLARATOR);

impl Declarator {
    pub fn pattern(&self) -> Option<Pat> {
        self.syntax.children().find_map(Pat::cast)
    }

    pub fn init(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }
}

ast_node!(FnDecl, FN_DECL);

impl FnLike for FnDecl {}

impl FnDecl {
    pub fn name(&self) -> Option<String> {
        function_name(&self.syntax)
    }
}

// ── Simple statements ──────────────────────────────────────────────────

ast_node!(ExprStmt, EXPR_STMT);

impl ExprStmt {
    pub fn expr(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }

    pub fn has_semicolon(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::SEMICOLON).is_some()
    }
}

ast_node!(EmptyStmt, EMPTY_STMT);

ast_node!(ReturnStmt, RETURN_STMT);

impl ReturnStmt {
    pub fn expr(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }
}

ast_node!(BreakStmt, BREAK_STMT);
ast_node!(ContinueStmt, CONTINUE_STMT);

ast_node!(ThrowStmt, THROW_STMT);

impl ThrowStmt {
    pub fn expr(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }
}

// ── Control flow ───────────────────────────────────────────────────────

ast_node!(IfStmt, IF_STMT);

impl IfStmt {
    pub fn condition(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }

    pub fn then_branch(&self) -> Option<Stmt> {
        first_stmt(&self.syntax)
    }

    pub fn else_branch(&self) -> Option<Stmt> {
        let clause = self.syntax.children().find(|n| n.kind() == SyntaxKind::ELSE_CLAUSE)?;
        first_stmt(&clause)
    }
}

ast_node!(WhileStmt, WHILE_STMT);

impl WhileStmt {
    pub fn condition(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }

    pub fn body(&self) -> Option<Stmt> {
        first_stmt(&self.syntax)
    }
}

ast_node!(DoWhileStmt, DO_WHILE_STMT);

impl DoWhileStmt {
    pub fn body(&self) -> Option<Stmt> {
        first_stmt(&self.syntax)
    }

    pub fn condition(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }
}

/// Initializer of a classic `for` loop.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ForInit {
    Decl(VarDecl),
    Expr(Expr),
}

ast_node!(ForStmt, FOR_STMT);

impl ForStmt {
    pub fn init(&self) -> Option<ForInit> {
        let init = self.clause(SyntaxKind::FOR_INIT)?;
        if let Some(decl) = child_node::<VarDecl>(&init) {
            return Some(ForInit::Decl(decl));
        }
        first_expr(&init).map(ForInit::Expr)
    }

    pub fn test(&self) -> Option<Expr> {
        first_expr(&self.clause(SyntaxKind::FOR_TEST)?)
    }

    pub fn update(&self) -> Option<Expr> {
        first_expr(&self.clause(SyntaxKind::FOR_UPDATE)?)
    }

    pub fn body(&self) -> Option<Stmt> {
        first_stmt(&self.syntax)
    }

    fn clause(&self, kind: SyntaxKind) -> Option<SyntaxNode> {
        self.syntax.children().find(|n| n.kind() == kind)
    }
}

ast_node!(ForInStmt, FOR_IN_STMT);

impl ForInStmt {
    /// The loop variable: a declaration or an assignment target.
    pub fn head(&self) -> Option<ForInit> {
        let first = self.syntax.children().next()?;
        if let Some(decl) = VarDecl::cast(first.clone()) {
            return Some(ForInit::Decl(decl));
        }
        Expr::cast(first).map(ForInit::Expr)
    }

    /// `true` for `for (x of xs)`, `false` for `for (k in obj)`.
    pub fn is_of(&self) -> bool {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .any(|t| t.kind() == SyntaxKind::IDENT && t.text() == "of")
    }

    pub fn iterable(&self) -> Option<Expr> {
        let skip = match self.head()? {
            ForInit::Decl(_) => 0,
            ForInit::Expr(_) => 1,
        };
        self.syntax.children().filter_map(Expr::cast).nth(skip)
    }

    pub fn body(&self) -> Option<Stmt> {
        body_after_head(&self.syntax)
    }
}

ast_node!(TryStmt, TRY_STMT);

impl TryStmt {
    pub fn block(&self) -> Option<Block> {
        child_node(&self.syntax)
    }

    pub fn catch_clause(&self) -> Option<CatchClause> {
        child_node(&self.syntax)
    }

    pub fn finally_block(&self) -> Option<Block> {
        let clause = self.syntax.children().find(|n| n.kind() == SyntaxKind::FINALLY_CLAUSE)?;
        child_node(&clause)
    }
}

ast_node!(CatchClause, CATCH_CLAUSE);

impl CatchClause {
    pub fn param(&self) -> Option<Pat> {
        self.syntax.children().find_map(Pat::cast)
    }

    pub fn body(&self) -> Option<Block> {
        child_node(&self.syntax)
    }
}

ast_node!(SwitchStmt, SWITCH_STMT);

impl SwitchStmt {
    pub fn discriminant(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }

    pub fn cases(&self) -> impl Iterator<Item = SwitchCase> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(SwitchCase, SWITCH_CASE);

impl SwitchCase {
    /// `None` for the `default` case.
    pub fn test(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }

    pub fn is_default(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::DEFAULT_KW).is_some()
    }

    pub fn stmts(&self) -> impl Iterator<Item = Stmt> + '_ {
        self.syntax.children().filter_map(Stmt::cast)
    }
}
