//! Typed AST nodes for expressions.

use crate::ast::pat::ParamList;
use crate::ast::stmt::Block;
use crate::ast::{ast_node, child_node, child_nodes, child_token, first_significant_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

// ── Expr enum ──────────────────────────────────────────────────────────

/// Any expression node. Spread elements are included so argument and
/// element lists can be walked in source order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Literal(Literal),
    Template(Template),
    TaggedTemplate(TaggedTemplate),
    NameRef(NameRef),
    This(ThisExpr),
    Array(ArrayExpr),
    Object(ObjectExpr),
    Spread(SpreadElement),
    Fn(FnExpr),
    Arrow(ArrowFn),
    Paren(ParenExpr),
    Member(MemberExpr),
    Index(IndexExpr),
    Call(CallExpr),
    New(NewExpr),
    Prefix(PrefixExpr),
    Await(AwaitExpr),
    Postfix(PostfixExpr),
    Binary(BinaryExpr),
    Assign(AssignExpr),
    Cond(CondExpr),
    Sequence(SequenceExpr),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        let expr = match node.kind() {
            SyntaxKind::LITERAL => Expr::Literal(Literal { syntax: node }),
            SyntaxKind::TEMPLATE => Expr::Template(Template { syntax: node }),
            SyntaxKind::TAGGED_TEMPLATE => Expr::TaggedTemplate(TaggedTemplate { syntax: node }),
            SyntaxKind::NAME_REF => Expr::NameRef(NameRef { syntax: node }),
            SyntaxKind::THIS_EXPR => Expr::This(ThisExpr { syntax: node }),
            SyntaxKind::ARRAY_EXPR => Expr::Array(ArrayExpr { syntax: node }),
            SyntaxKind::OBJECT_EXPR => Expr::Object(ObjectExpr { syntax: node }),
            SyntaxKind::SPREAD_ELEMENT => Expr::Spread(SpreadElement { syntax: node }),
            SyntaxKind::FN_EXPR => Expr::Fn(FnExpr { syntax: node }),
            SyntaxKind::ARROW_FN => Expr::Arrow(ArrowFn { syntax: node }),
            SyntaxKind::PAREN_EXPR => Expr::Paren(ParenExpr { syntax: node }),
            SyntaxKind::MEMBER_EXPR => Expr::Member(MemberExpr { syntax: node }),
            SyntaxKind::INDEX_EXPR => Expr::Index(IndexExpr { syntax: node }),
            SyntaxKind::CALL_EXPR => Expr::Call(CallExpr { syntax: node }),
            SyntaxKind::NEW_EXPR => Expr::New(NewExpr { syntax: node }),
            SyntaxKind::PREFIX_EXPR => Expr::Prefix(PrefixExpr { syntax: node }),
            SyntaxKind::AWAIT_EXPR => Expr::Await(AwaitExpr { syntax: node }),
            SyntaxKind::POSTFIX_EXPR => Expr::Postfix(PostfixExpr { syntax: node }),
            SyntaxKind::BINARY_EXPR => Expr::Binary(BinaryExpr { syntax: node }),
            SyntaxKind::ASSIGN_EXPR => Expr::Assign(AssignExpr { syntax: node }),
            SyntaxKind::COND_EXPR => Expr::Cond(CondExpr { syntax: node }),
            SyntaxKind::SEQUENCE_EXPR => Expr::Sequence(SequenceExpr { syntax: node }),
            _ => return None,
        };
        Some(expr)
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::Literal(n) => &n.syntax,
            Expr::Template(n) => &n.syntax,
            Expr::TaggedTemplate(n) => &n.syntax,
            Expr::NameRef(n) => &n.syntax,
            Expr::This(n) => &n.syntax,
            Expr::Array(n) => &n.syntax,
            Expr::Object(n) => &n.syntax,
            Expr::Spread(n) => &n.syntax,
            Expr::Fn(n) => &n.syntax,
            Expr::Arrow(n) => &n.syntax,
            Expr::Paren(n) => &n.syntax,
            Expr::Member(n) => &n.syntax,
            Expr::Index(n) => &n.syntax,
            Expr::Call(n) => &n.syntax,
            Expr::New(n) => &n.syntax,
            Expr::Prefix(n) => &n.syntax,
            Expr::Await(n) => &n.syntax,
            Expr::Postfix(n) => &n.syntax,
            Expr::Binary(n) => &n.syntax,
            Expr::Assign(n) => &n.syntax,
            Expr::Cond(n) => &n.syntax,
            Expr::Sequence(n) => &n.syntax,
        }
    }
}

fn nth_expr(node: &SyntaxNode, n: usize) -> Option<Expr> {
    node.children().filter_map(Expr::cast).nth(n)
}

// ── Literals ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    String,
    Regex,
    Boolean,
    Null,
}

ast_node!(Literal, LITERAL);

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        first_significant_token(&self.syntax)
    }

    pub fn kind(&self) -> Option<LiteralKind> {
        let kind = match self.token()?.kind() {
            SyntaxKind::NUMBER => LiteralKind::Number,
            SyntaxKind::STRING => LiteralKind::String,
            SyntaxKind::REGEX => LiteralKind::Regex,
            SyntaxKind::TRUE_KW | SyntaxKind::FALSE_KW => LiteralKind::Boolean,
            SyntaxKind::NULL_KW => LiteralKind::Null,
            _ => return None,
        };
        Some(kind)
    }

    /// Contents of a string literal without its quotes. Escapes are kept
    /// as written.
    pub fn string_value(&self) -> Option<String> {
        let token = self.token()?;
        if token.kind() != SyntaxKind::STRING {
            return None;
        }
        let text = token.text();
        text.get(1..text.len().saturating_sub(1)).map(str::to_string)
    }
}

ast_node!(Template, TEMPLATE);

impl Template {
    pub fn interpolations(&self) -> impl Iterator<Item = Interpolation> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(Interpolation, INTERPOLATION);

impl Interpolation {
    pub fn expr(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }
}

ast_node!(TaggedTemplate, TAGGED_TEMPLATE);

impl TaggedTemplate {
    pub fn tag(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn template(&self) -> Option<Template> {
        self.syntax.children().filter_map(Template::cast).last()
    }
}

// ── Names ──────────────────────────────────────────────────────────────

ast_node!(NameRef, NAME_REF);

impl NameRef {
    pub fn text(&self) -> Option<String> {
        child_token(&self.syntax, SyntaxKind::IDENT).map(|t| t.text().to_string())
    }
}

ast_node!(ThisExpr, THIS_EXPR);

// ── Array and object literals ──────────────────────────────────────────

ast_node!(ArrayExpr, ARRAY_EXPR);

impl ArrayExpr {
    /// Elements in source order; holes are skipped.
    pub fn elements(&self) -> impl Iterator<Item = Expr> + '_ {
        self.syntax.children().filter_map(Expr::cast)
    }
}

ast_node!(SpreadElement, SPREAD_ELEMENT);

impl SpreadElement {
    pub fn expr(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }
}

ast_node!(ObjectExpr, OBJECT_EXPR);

/// A member of an object literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectMember {
    Property(Property),
    Method(Method),
    Spread(SpreadElement),
}

impl ObjectExpr {
    pub fn members(&self) -> impl Iterator<Item = ObjectMember> + '_ {
        self.syntax.children().filter_map(|node| match node.kind() {
            SyntaxKind::PROPERTY => Some(ObjectMember::Property(Property { syntax: node })),
            SyntaxKind::METHOD => Some(ObjectMember::Method(Method { syntax: node })),
            SyntaxKind::SPREAD_ELEMENT => Some(ObjectMember::Spread(SpreadElement { syntax: node })),
            _ => None,
        })
    }
}

/// Key of an object member or object-pattern property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropKey {
    Name(PropName),
    Computed(ComputedName),
}

impl PropKey {
    pub(crate) fn find(parent: &SyntaxNode) -> Option<Self> {
        parent.children().find_map(|node| match node.kind() {
            SyntaxKind::PROP_NAME => Some(PropKey::Name(PropName { syntax: node })),
            SyntaxKind::COMPUTED_NAME => Some(PropKey::Computed(ComputedName { syntax: node })),
            _ => None,
        })
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            PropKey::Name(n) => &n.syntax,
            PropKey::Computed(n) => &n.syntax,
        }
    }
}

ast_node!(PropName, PROP_NAME);

impl PropName {
    pub fn text(&self) -> Option<String> {
        first_significant_token(&self.syntax).map(|t| t.text().to_string())
    }
}

ast_node!(ComputedName, COMPUTED_NAME);

impl ComputedName {
    pub fn expr(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }
}

ast_node!(Property, PROPERTY);

impl Property {
    /// `None` for shorthand properties.
    pub fn key(&self) -> Option<PropKey> {
        PropKey::find(&self.syntax)
    }

    /// The value; for shorthand `{ name }` this is the name reference.
    pub fn value(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }
}

ast_node!(Method, METHOD);

impl Method {
    pub fn key(&self) -> Option<PropKey> {
        PropKey::find(&self.syntax)
    }
}

// ── Functions ──────────────────────────────────────────────────────────

/// Body of a function: a block, or the expression of a concise arrow.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FnBody {
    Block(Block),
    Expr(Expr),
}

/// Accessors shared by function declarations, function expressions,
/// arrows and object methods.
pub trait FnLike: AstNode {
    /// Whether the function carries an `async` modifier: a leading
    /// `async` token directly inside the node.
    fn is_async(&self) -> bool {
        let first = self
            .syntax()
            .children_with_tokens()
            .find(|it| !it.kind().is_trivia());
        matches!(
            first,
            Some(rowan::NodeOrToken::Token(token))
                if token.kind() == SyntaxKind::IDENT && token.text() == "async"
        )
    }

    fn param_list(&self) -> Option<ParamList> {
        child_node(self.syntax())
    }

    fn body(&self) -> Option<FnBody> {
        self.syntax().children().find_map(|node| {
            if let Some(block) = Block::cast(node.clone()) {
                return Some(FnBody::Block(block));
            }
            Expr::cast(node).map(FnBody::Expr)
        })
    }
}

/// Name token following the `function` keyword.
pub(crate) fn function_name(node: &SyntaxNode) -> Option<String> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .skip_while(|t| t.kind() != SyntaxKind::FUNCTION_KW)
        .find(|t| t.kind() == SyntaxKind::IDENT)
        .map(|t| t.text().to_string())
}

ast_node!(FnExpr, FN_EXPR);

impl FnLike for FnExpr {}

impl FnExpr {
    pub fn name(&self) -> Option<String> {
        function_name(&self.syntax)
    }
}

ast_node!(ArrowFn, ARROW_FN);

impl FnLike for ArrowFn {}

impl FnLike for Method {}

// ── Access chains ──────────────────────────────────────────────────────

ast_node!(ParenExpr, PAREN_EXPR);

impl ParenExpr {
    pub fn expr(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }
}

ast_node!(MemberExpr, MEMBER_EXPR);

impl MemberExpr {
    pub fn object(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn name(&self) -> Option<String> {
        let name = self.syntax.children().find(|n| n.kind() == SyntaxKind::NAME)?;
        first_significant_token(&name).map(|t| t.text().to_string())
    }

    pub fn is_optional(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::QUESTION_DOT).is_some()
    }
}

ast_node!(IndexExpr, INDEX_EXPR);

impl IndexExpr {
    pub fn object(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn index(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }
}

ast_node!(ArgList, ARG_LIST);

impl ArgList {
    pub fn args(&self) -> impl Iterator<Item = Expr> + '_ {
        self.syntax.children().filter_map(Expr::cast)
    }
}

ast_node!(CallExpr, CALL_EXPR);

impl CallExpr {
    pub fn callee(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        child_node(&self.syntax)
    }

    pub fn args(&self) -> impl Iterator<Item = Expr> {
        self.arg_list()
            .into_iter()
            .flat_map(|list| list.syntax.children().filter_map(Expr::cast).collect::<Vec<_>>())
    }
}

ast_node!(NewExpr, NEW_EXPR);

impl NewExpr {
    pub fn callee(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        child_node(&self.syntax)
    }
}

// ── Operators ──────────────────────────────────────────────────────────

ast_node!(PrefixExpr, PREFIX_EXPR);

impl PrefixExpr {
    pub fn op(&self) -> Option<SyntaxToken> {
        first_significant_token(&self.syntax)
    }

    pub fn operand(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }
}

ast_node!(AwaitExpr, AWAIT_EXPR);

impl AwaitExpr {
    pub fn expr(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }
}

ast_node!(PostfixExpr, POSTFIX_EXPR);

impl PostfixExpr {
    pub fn operand(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn op(&self) -> Option<SyntaxToken> {
        first_significant_token(&self.syntax)
    }
}

ast_node!(BinaryExpr, BINARY_EXPR);

impl BinaryExpr {
    pub fn lhs(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn rhs(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }

    pub fn op(&self) -> Option<SyntaxToken> {
        first_significant_token(&self.syntax)
    }
}

ast_node!(AssignExpr, ASSIGN_EXPR);

impl AssignExpr {
    /// Assignment target. Destructuring targets appear as array or object
    /// literals.
    pub fn target(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn value(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }

    pub fn op(&self) -> Option<SyntaxToken> {
        first_significant_token(&self.syntax)
    }

    /// Whether this is a compound assignment such as `+=`.
    pub fn is_compound(&self) -> bool {
        self.op().is_some_and(|t| t.kind() != SyntaxKind::EQ)
    }
}

ast_node!(CondExpr, COND_EXPR);

impl CondExpr {
    pub fn test(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn consequent(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }

    pub fn alternate(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 2)
    }
}

ast_node!(SequenceExpr, SEQUENCE_EXPR);

impl SequenceExpr {
    pub fn exprs(&self) -> impl Iterator<Item = Expr> + '_ {
        self.syntax.children().filter_map(Expr::cast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::stmt::Stmt;
    use crate::parse;

    fn first_expr(source: &str) -> Expr {
        let parse = parse(source);
        assert!(parse.ok(), "{:?}", parse.errors());
        match parse.tree().stmts().next() {
            Some(Stmt::Expr(stmt)) => stmt.expr().expect("expression"),
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn async_modifiers() {
        let Expr::Arrow(arrow) = first_expr("async x => x") else {
            panic!("arrow");
        };
        assert!(arrow.is_async());
        let Expr::Arrow(arrow) = first_expr("async => 1") else {
            panic!("arrow");
        };
        assert!(!arrow.is_async());
    }

    #[test]
    fn optional_member_access() {
        let Expr::Member(member) = first_expr("a?.b") else {
            panic!("member");
        };
        assert!(member.is_optional());
        assert_eq!(member.name().as_deref(), Some("b"));
        let Expr::Member(member) = first_expr("a.b") else {
            panic!("member");
        };
        assert!(!member.is_optional());
    }

    #[test]
    fn string_index_value() {
        let Expr::Index(index) = first_expr("db['users']") else {
            panic!("index");
        };
        let Some(Expr::Literal(lit)) = index.index() else {
            panic!("literal index");
        };
        assert_eq!(lit.string_value().as_deref(), Some("users"));
    }

    #[test]
    fn compound_assignment_flag() {
        let Expr::Assign(assign) = first_expr("x += 1") else {
            panic!("assign");
        };
        assert!(assign.is_compound());
        let Expr::Assign(assign) = first_expr("x = 1") else {
            panic!("assign");
        };
        assert!(!assign.is_compound());
    }

    #[test]
    fn object_members() {
        let Expr::Paren(paren) = first_expr("({ a, b: 1, c() {}, async d() {}, ...e })") else {
            panic!("paren");
        };
        let Some(Expr::Object(object)) = paren.expr() else {
            panic!("object");
        };
        let members: Vec<_> = object.members().collect();
        assert_eq!(members.len(), 5);
        assert!(matches!(&members[0], ObjectMember::Property(p) if p.key().is_none()));
        assert!(matches!(&members[2], ObjectMember::Method(m) if !m.is_async()));
        assert!(matches!(&members[3], ObjectMember::Method(m) if m.is_async()));
        assert!(matches!(&members[4], ObjectMember::Spread(_)));
    }
}
