//! Abstract Syntax Tree types for the Java subset

use std::fmt;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Valid Java identifier (letters, digits, `_` and `$`, not starting with a digit)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dotted name such as `java.util.List`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName(pub Vec<Identifier>);

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.0.iter().map(Identifier::as_str).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Root AST node - a complete compilation unit
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub package: Option<QualifiedName>,
    pub imports: Vec<ImportDecl>,
    pub items: Vec<Spanned<Item>>,
}

impl CompilationUnit {
    /// All methods declared at top level or directly inside top-level classes
    pub fn methods(&self) -> Vec<&MethodDecl> {
        let mut methods = Vec::new();
        for item in &self.items {
            match &item.node {
                Item::Member(Member::Method(m)) => methods.push(m),
                Item::Class(class) => {
                    for member in &class.members {
                        if let Member::Method(m) = &member.node {
                            methods.push(m);
                        }
                    }
                }
                Item::Member(_) => {}
            }
        }
        methods
    }

    /// Top-level class declarations
    pub fn classes(&self) -> Vec<&ClassDecl> {
        self.items
            .iter()
            .filter_map(|item| match &item.node {
                Item::Class(c) => Some(c),
                Item::Member(_) => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub is_static: bool,
    pub path: QualifiedName,
    pub wildcard: bool,
}

/// Top-level item: a type declaration, or a bare member for member-level templates
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Class(ClassDecl),
    Member(Member),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub modifiers: Vec<Modifier>,
    pub kind: ClassKind,
    pub name: Spanned<Identifier>,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub members: Vec<Spanned<Member>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: Identifier,
    pub bounds: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
    Default,
    Annotation(Annotation),
}

/// `@Name` or `@Name(args)`; element-value pairs parse as assignment expressions
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: QualifiedName,
    pub args: Vec<Expr>,
}

/// Class body member
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Class(ClassDecl),
    Initializer { is_static: bool, body: Block },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub modifiers: Vec<Modifier>,
    pub ty: TypeRef,
    pub declarators: Vec<Declarator>,
}

/// `name[] = init` inside a field or local variable declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: Spanned<Identifier>,
    pub dims: usize,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultType {
    Void,
    Type(TypeRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub modifiers: Vec<Modifier>,
    pub type_params: Vec<TypeParam>,
    pub result: ResultType,
    pub name: Spanned<Identifier>,
    pub params: Vec<Param>,
    pub throws: Vec<TypeRef>,
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    pub modifiers: Vec<Modifier>,
    pub name: Spanned<Identifier>,
    pub params: Vec<Param>,
    pub throws: Vec<TypeRef>,
    pub body: Block,
}

/// Formal parameter of a method, constructor or catch clause
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub is_final: bool,
    pub ty: TypeRef,
    pub varargs: bool,
    pub name: Spanned<Identifier>,
    pub dims: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn keyword(&self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Char => "char",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }
}

/// One segment of a class type: `Map<K, V>` in `java.util.Map<K, V>`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSegment {
    pub name: Identifier,
    pub args: Vec<TypeArg>,
}

/// A type as written in source
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Primitive(PrimitiveType),
    Class(Vec<TypeSegment>),
    Array(Box<TypeRef>),
}

impl TypeRef {
    pub fn array_of(elem: TypeRef, dims: usize) -> TypeRef {
        (0..dims).fold(elem, |ty, _| TypeRef::Array(Box::new(ty)))
    }

    /// Simple name of the last class segment, if this is a class type
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            TypeRef::Class(segments) => segments.last().map(|s| s.name.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => write!(f, "{}", p.keyword()),
            TypeRef::Array(elem) => write!(f, "{}[]", elem),
            TypeRef::Class(segments) => {
                for (i, seg) in segments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", seg.name)?;
                    if !seg.args.is_empty() {
                        let args: Vec<String> = seg.args.iter().map(|a| a.to_string()).collect();
                        write!(f, "<{}>", args.join(", "))?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeArg {
    Type(TypeRef),
    Wildcard(Option<WildcardBound>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WildcardBound {
    Extends(TypeRef),
    Super(TypeRef),
}

impl fmt::Display for TypeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeArg::Type(t) => write!(f, "{}", t),
            TypeArg::Wildcard(None) => write!(f, "?"),
            TypeArg::Wildcard(Some(WildcardBound::Extends(t))) => write!(f, "? extends {}", t),
            TypeArg::Wildcard(Some(WildcardBound::Super(t))) => write!(f, "? super {}", t),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Spanned<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVarDecl {
    pub is_final: bool,
    pub ty: TypeRef,
    pub declarators: Vec<Declarator>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    LocalVar(LocalVarDecl),
    Exprs(Vec<Expr>),
}

/// `final Type name = init` in a try-with-resources header
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub is_final: bool,
    pub ty: TypeRef,
    pub name: Spanned<Identifier>,
    pub init: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub types: Vec<TypeRef>,
    pub name: Spanned<Identifier>,
    pub body: Block,
}

/// `case label:` or `default:` followed by its statements
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchGroup {
    pub label: Option<Expr>,
    pub body: Vec<Spanned<Stmt>>,
}

/// Block statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(Block),
    LocalVar(LocalVarDecl),
    LocalClass(ClassDecl),
    Expr(Expr),
    Labeled {
        label: Identifier,
        body: Box<Spanned<Stmt>>,
    },
    If {
        cond: Expr,
        then: Box<Spanned<Stmt>>,
        otherwise: Option<Box<Spanned<Stmt>>>,
    },
    While {
        cond: Expr,
        body: Box<Spanned<Stmt>>,
    },
    DoWhile {
        body: Box<Spanned<Stmt>>,
        cond: Expr,
    },
    For {
        init: Option<ForInit>,
        cond: Option<Expr>,
        update: Vec<Expr>,
        body: Box<Spanned<Stmt>>,
    },
    ForEach {
        is_final: bool,
        ty: TypeRef,
        name: Spanned<Identifier>,
        iterable: Expr,
        body: Box<Spanned<Stmt>>,
    },
    Switch {
        selector: Expr,
        groups: Vec<SwitchGroup>,
    },
    Return(Option<Expr>),
    Break(Option<Identifier>),
    Continue(Option<Identifier>),
    Throw(Expr),
    Assert {
        cond: Expr,
        message: Option<Expr>,
    },
    Try {
        resources: Vec<Resource>,
        body: Block,
        catches: Vec<CatchClause>,
        finally: Option<Block>,
    },
    Synchronized {
        lock: Expr,
        body: Block,
    },
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(String),
    Float(String),
    Char(String),
    String(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    PreInc,
    PreDec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Inc,
    Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Shl,
    Shr,
    Ushr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Ushr,
}

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Name(Identifier),
    This,
    Super,
    /// `Type.class`
    ClassLit(TypeRef),
    Field {
        target: Box<Expr>,
        name: Identifier,
    },
    /// `Outer.this`
    QualifiedThis(Box<Expr>),
    /// `Iface.super`, only ever the target of a call or field access
    QualifiedSuper(Box<Expr>),
    Call {
        target: Option<Box<Expr>>,
        /// Explicit type arguments as in `Collections.<String>emptyList()`
        type_args: Vec<TypeArg>,
        name: Identifier,
        args: Vec<Expr>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    /// Instance creation; `outer` is set for `x.new Inner()`, `body` for anonymous classes
    New {
        outer: Option<Box<Expr>>,
        ty: TypeRef,
        args: Vec<Expr>,
        body: Option<Vec<Spanned<Member>>>,
    },
    NewArray {
        elem: TypeRef,
        dims: Vec<Expr>,
        extra_dims: usize,
        init: Option<Vec<Expr>>,
    },
    ArrayInit(Vec<Expr>),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Postfix {
        op: PostfixOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Cast {
        ty: TypeRef,
        expr: Box<Expr>,
    },
    InstanceOf {
        expr: Box<Expr>,
        ty: TypeRef,
    },
    Lambda {
        params: Vec<Identifier>,
        body: LambdaBody,
    },
    MethodRef {
        target: Box<Expr>,
        name: Identifier,
    },
    /// Method reference on a type that is not a plain name: `String[]::new`, `List<T>::size`
    TypeMethodRef {
        ty: TypeRef,
        name: Identifier,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

impl Expr {
    /// Expressions Java accepts as a statement on their own
    pub fn is_statement_expression(&self) -> bool {
        matches!(
            self,
            Expr::Assign { .. }
                | Expr::Call { .. }
                | Expr::New { .. }
                | Expr::Postfix { .. }
                | Expr::Unary {
                    op: UnaryOp::PreInc | UnaryOp::PreDec,
                    ..
                }
        )
    }

    /// Whether the expression is, or contains, a reference to the simple name `name`.
    ///
    /// Statement bodies of lambdas and anonymous classes are not part of the expression.
    pub fn mentions(&self, name: &str) -> bool {
        match self {
            Expr::Name(id) => id.as_str() == name,
            Expr::Literal(_)
            | Expr::This
            | Expr::Super
            | Expr::ClassLit(_)
            | Expr::TypeMethodRef { .. } => false,
            Expr::QualifiedThis(target) | Expr::QualifiedSuper(target) => target.mentions(name),
            Expr::Field { target, .. } => target.mentions(name),
            Expr::Call { target, args, .. } => {
                target.as_ref().is_some_and(|t| t.mentions(name))
                    || args.iter().any(|a| a.mentions(name))
            }
            Expr::Index { target, index } => target.mentions(name) || index.mentions(name),
            Expr::New { outer, args, .. } => {
                outer.as_ref().is_some_and(|o| o.mentions(name))
                    || args.iter().any(|a| a.mentions(name))
            }
            Expr::NewArray { dims, init, .. } => {
                dims.iter().any(|d| d.mentions(name))
                    || init
                        .as_ref()
                        .is_some_and(|items| items.iter().any(|i| i.mentions(name)))
            }
            Expr::ArrayInit(items) => items.iter().any(|i| i.mentions(name)),
            Expr::Unary { expr, .. } | Expr::Postfix { expr, .. } => expr.mentions(name),
            Expr::Binary { lhs, rhs, .. } => lhs.mentions(name) || rhs.mentions(name),
            Expr::Assign { target, value, .. } => target.mentions(name) || value.mentions(name),
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => cond.mentions(name) || then.mentions(name) || otherwise.mentions(name),
            Expr::Cast { expr, .. } | Expr::InstanceOf { expr, .. } => expr.mentions(name),
            Expr::Lambda { body, .. } => match body {
                LambdaBody::Expr(expr) => expr.mentions(name),
                LambdaBody::Block(_) => false,
            },
            Expr::MethodRef { target, .. } => target.mentions(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_type(name: &str) -> TypeRef {
        TypeRef::Class(vec![TypeSegment {
            name: Identifier::new(name),
            args: vec![],
        }])
    }

    #[test]
    fn test_type_display() {
        let list = TypeRef::Class(vec![TypeSegment {
            name: Identifier::new("List"),
            args: vec![
                TypeArg::Type(class_type("String")),
                TypeArg::Wildcard(Some(WildcardBound::Extends(class_type("Number")))),
            ],
        }]);
        assert_eq!(list.to_string(), "List<String, ? extends Number>");
        assert_eq!(
            TypeRef::array_of(TypeRef::Primitive(PrimitiveType::Int), 2).to_string(),
            "int[][]"
        );
    }

    #[test]
    fn test_statement_expressions() {
        let call = Expr::Call {
            target: None,
            type_args: vec![],
            name: Identifier::new("run"),
            args: vec![],
        };
        assert!(call.is_statement_expression());

        let sum = Expr::Binary {
            op: BinaryOp::Add,
            lhs: Box::new(Expr::Name(Identifier::new("a"))),
            rhs: Box::new(Expr::Literal(Literal::Int("1".to_string()))),
        };
        assert!(!sum.is_statement_expression());

        let negate = Expr::Unary {
            op: UnaryOp::Minus,
            expr: Box::new(Expr::Name(Identifier::new("a"))),
        };
        assert!(!negate.is_statement_expression());
    }

    #[test]
    fn test_mentions_walks_nested_expressions() {
        let expr = Expr::Conditional {
            cond: Box::new(Expr::Name(Identifier::new("flag"))),
            then: Box::new(Expr::Call {
                target: Some(Box::new(Expr::Name(Identifier::new("list")))),
                type_args: vec![],
                name: Identifier::new("get"),
                args: vec![Expr::Name(Identifier::new("hole"))],
            }),
            otherwise: Box::new(Expr::Literal(Literal::Null)),
        };
        assert!(expr.mentions("hole"));
        assert!(expr.mentions("list"));
        assert!(!expr.mentions("get"));
    }

    #[test]
    fn test_mentions_stops_at_statement_bodies() {
        let hole = || Expr::Name(Identifier::new("hole"));
        let body = Block {
            stmts: vec![Spanned::new(Stmt::Return(Some(hole())), 0..0)],
        };
        let lambda = Expr::Lambda {
            params: vec![],
            body: LambdaBody::Block(body),
        };
        assert!(!lambda.mentions("hole"));

        let anonymous = Expr::New {
            outer: None,
            ty: class_type("Runnable"),
            args: vec![hole()],
            body: Some(vec![]),
        };
        assert!(anonymous.mentions("hole"));
    }
}
