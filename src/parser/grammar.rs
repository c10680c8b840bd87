//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;
use chumsky::recursive::{Indirect, Recursive};

use crate::config::LanguageLevel;
use crate::error::ParseError;
use crate::parser::ast::*;
use crate::parser::lexer::{self, Token};
use crate::parser::stack::ensure_sufficient_stack;

type ParserExtra<'a> = extra::Err<Rich<'a, Token>>;

/// Trailing accessors of a primary expression, folded left to right
#[derive(Debug, Clone)]
enum Selector {
    Member(Identifier, Option<Vec<Expr>>),
    GenericCall(Vec<TypeArg>, Identifier, Vec<Expr>),
    Index(Expr),
    MethodRef(Identifier),
    This,
    Super,
    Creation(Creation),
}

/// `Type(args) { body }` after `new`
type Creation = (TypeRef, Vec<Expr>, Option<Vec<Spanned<Member>>>);

/// Right-hand side of a relational operator
#[derive(Debug, Clone)]
enum Relation {
    Compare(BinaryOp, Expr),
    InstanceOf(TypeRef),
}

/// Parse a whole compilation unit at the given source level
pub fn parse_unit(input: &str, level: LanguageLevel) -> (Option<CompilationUnit>, Vec<ParseError>) {
    let (tokens, mut errors) = lex_all(input);
    if !errors.is_empty() {
        return (None, errors);
    }

    let len = input.len();
    let (unit, errs) = ensure_sufficient_stack(|| {
        let token_stream =
            Stream::from_iter(tokens.into_iter().map(|(t, s)| (t, SimpleSpan::from(s))))
                .map((len..len).into(), |(t, s): (_, _)| (t, s));

        let (unit_parser, _) = java_grammar(level);
        unit_parser.parse(token_stream).into_output_errors()
    });
    errors.extend(errs.into_iter().map(ParseError::from));
    (unit, errors)
}

/// Parse a sequence of block statements at the given source level.
///
/// With `recovery` set, member modifiers in front of the first statement are dropped
/// so a field declaration line still yields a local variable declaration.
pub fn parse_statements(
    input: &str,
    level: LanguageLevel,
    recovery: bool,
) -> (Option<Vec<Spanned<Stmt>>>, Vec<ParseError>) {
    let (mut tokens, mut errors) = lex_all(input);
    if !errors.is_empty() {
        return (None, errors);
    }

    if recovery {
        let skipped = tokens.iter().take_while(|(t, _)| t.is_member_modifier()).count();
        tokens.drain(..skipped);
    }

    let len = input.len();
    let (stmts, errs) = ensure_sufficient_stack(|| {
        let token_stream =
            Stream::from_iter(tokens.into_iter().map(|(t, s)| (t, SimpleSpan::from(s))))
                .map((len..len).into(), |(t, s): (_, _)| (t, s));

        let (_, statements_parser) = java_grammar(level);
        statements_parser.parse(token_stream).into_output_errors()
    });
    errors.extend(errs.into_iter().map(ParseError::from));
    (stmts, errors)
}

/// Split lexer output into tokens and lexical diagnostics
fn lex_all(input: &str) -> (Vec<(Token, lexer::Span)>, Vec<ParseError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    for result in lexer::lex(input) {
        match result {
            Ok(token) => tokens.push(token),
            Err(span) => errors.push(ParseError::Lexical {
                text: input.get(span.clone()).unwrap_or_default().to_string(),
                span,
            }),
        }
    }
    (tokens, errors)
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

/// Reject a construct the configured source level doesn't know about
fn require<'a>(
    level: LanguageLevel,
    min: LanguageLevel,
    message: &str,
    span: SimpleSpan,
) -> Result<(), Rich<'a, Token>> {
    if level >= min {
        Ok(())
    } else {
        Err(Rich::custom(span, message))
    }
}

fn apply_selectors<'a>(
    base: Expr,
    selectors: Vec<Selector>,
    level: LanguageLevel,
    span: SimpleSpan,
) -> Result<Expr, Rich<'a, Token>> {
    selectors
        .into_iter()
        .try_fold(base, |target, selector| match selector {
            Selector::Member(name, None) => Ok(Expr::Field {
                target: Box::new(target),
                name,
            }),
            Selector::Member(name, Some(args)) => Ok(Expr::Call {
                target: Some(Box::new(target)),
                type_args: Vec::new(),
                name,
                args,
            }),
            Selector::GenericCall(type_args, name, args) => Ok(Expr::Call {
                target: Some(Box::new(target)),
                type_args,
                name,
                args,
            }),
            // only a type name can qualify `this` or `super`
            Selector::This | Selector::Super
                if !matches!(target, Expr::Name(_) | Expr::Field { .. }) =>
            {
                Err(Rich::custom(
                    span,
                    "Syntax error, insert \"Identifier\" to complete QualifiedName",
                ))
            }
            Selector::This => Ok(Expr::QualifiedThis(Box::new(target))),
            Selector::Super => Ok(Expr::QualifiedSuper(Box::new(target))),
            Selector::Creation((ty, args, body)) => Ok(Expr::New {
                outer: Some(Box::new(target)),
                ty,
                args,
                body,
            }),
            Selector::Index(index) => Ok(Expr::Index {
                target: Box::new(target),
                index: Box::new(index),
            }),
            Selector::MethodRef(name) => {
                require(
                    level,
                    LanguageLevel::Java8,
                    "Method references are allowed only at source level 1.8 or above",
                    span,
                )?;
                Ok(Expr::MethodRef {
                    target: Box::new(target),
                    name,
                })
            }
        })
}

fn ident<'a, I>() -> impl Parser<'a, I, Identifier, ParserExtra<'a>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    select! {
        Token::Ident(s) => Identifier::new(s),
    }
}

fn spanned_ident<'a, I>() -> impl Parser<'a, I, Spanned<Identifier>, ParserExtra<'a>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    ident().map_with(|id, e| Spanned::new(id, span_range(&e.span())))
}

fn qualified_name<'a, I>() -> impl Parser<'a, I, QualifiedName, ParserExtra<'a>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    ident()
        .then(
            just(Token::Dot)
                .ignore_then(ident())
                .repeated()
                .collect::<Vec<_>>(),
        )
        .map(|(first, rest)| QualifiedName(std::iter::once(first).chain(rest).collect()))
}

fn primitive_type<'a, I>() -> impl Parser<'a, I, PrimitiveType, ParserExtra<'a>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    select! {
        Token::Boolean => PrimitiveType::Boolean,
        Token::Byte => PrimitiveType::Byte,
        Token::Short => PrimitiveType::Short,
        Token::Int => PrimitiveType::Int,
        Token::Long => PrimitiveType::Long,
        Token::Char => PrimitiveType::Char,
        Token::Float => PrimitiveType::Float,
        Token::Double => PrimitiveType::Double,
    }
}

/// Count of `[]` pairs
fn dims<'a, I>() -> impl Parser<'a, I, usize, ParserExtra<'a>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    just(Token::BracketOpen)
        .then(just(Token::BracketClose))
        .repeated()
        .collect::<Vec<_>>()
        .map(|pairs| pairs.len())
}

fn type_args<'a, I, T>(ty: T) -> impl Parser<'a, I, Vec<TypeArg>, ParserExtra<'a>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
    T: Parser<'a, I, TypeRef, ParserExtra<'a>> + Clone,
{
    let bound = choice((
        just(Token::Extends)
            .ignore_then(ty.clone())
            .map(WildcardBound::Extends),
        just(Token::Super)
            .ignore_then(ty.clone())
            .map(WildcardBound::Super),
    ));

    let wildcard = just(Token::Question)
        .ignore_then(bound.or_not())
        .map(TypeArg::Wildcard);

    let reference = ty.try_map(|ty, span: SimpleSpan| match ty {
        TypeRef::Primitive(_) => Err(Rich::custom(
            span,
            "Syntax error, insert \"Dimensions\" to complete ReferenceType",
        )),
        other => Ok(TypeArg::Type(other)),
    });

    choice((wildcard, reference))
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect::<Vec<_>>()
        .delimited_by(just(Token::Less), just(Token::Greater))
}

/// Dotted class type without array dimensions, e.g. `java.util.Map.Entry<K, V>`
fn class_type<'a, I, A>(args: A) -> impl Parser<'a, I, TypeRef, ParserExtra<'a>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
    A: Parser<'a, I, Vec<TypeArg>, ParserExtra<'a>> + Clone,
{
    let segment = ident().then(args.or_not()).map(|(name, args)| TypeSegment {
        name,
        args: args.unwrap_or_default(),
    });

    segment
        .clone()
        .then(
            just(Token::Dot)
                .ignore_then(segment)
                .repeated()
                .collect::<Vec<_>>(),
        )
        .map(|(first, rest)| TypeRef::Class(std::iter::once(first).chain(rest).collect()))
}

fn type_ref<'a, I>() -> impl Parser<'a, I, TypeRef, ParserExtra<'a>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|ty| {
        choice((
            primitive_type().map(TypeRef::Primitive),
            class_type(type_args(ty)),
        ))
        .then(dims())
        .map(|(ty, dims)| TypeRef::array_of(ty, dims))
        .boxed()
    })
}

fn array_initializer<'a, I, E>(expr: E) -> impl Parser<'a, I, Vec<Expr>, ParserExtra<'a>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
    E: Parser<'a, I, Expr, ParserExtra<'a>> + Clone + 'a,
{
    recursive(|init| {
        choice((init.map(Expr::ArrayInit), expr))
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::BraceOpen), just(Token::BraceClose))
            .boxed()
    })
}

/// One precedence level of left-associative binary operators
fn binary_level<'a, I, P, O>(operand: P, op: O) -> impl Parser<'a, I, Expr, ParserExtra<'a>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
    P: Parser<'a, I, Expr, ParserExtra<'a>> + Clone + 'a,
    O: Parser<'a, I, BinaryOp, ParserExtra<'a>> + Clone + 'a,
{
    operand
        .clone()
        .then(op.then(operand).repeated().collect::<Vec<_>>())
        .map(|(first, rest)| {
            rest.into_iter().fold(first, |lhs, (op, rhs)| Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            })
        })
        .boxed()
}

/// Expressions; `block` and `class_body` feed lambda bodies and anonymous classes
fn expression<'a, I, B, C>(
    level: LanguageLevel,
    block: B,
    class_body: C,
) -> impl Parser<'a, I, Expr, ParserExtra<'a>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
    B: Parser<'a, I, Block, ParserExtra<'a>> + Clone + 'a,
    C: Parser<'a, I, Vec<Spanned<Member>>, ParserExtra<'a>> + Clone + 'a,
{
    let ty = type_ref();
    let base_ty = choice((
        primitive_type().map(TypeRef::Primitive),
        class_type(type_args(ty.clone())),
    ));

    // `new` is the only place the diamond may appear
    let diamond = just(Token::Less)
        .then(just(Token::Greater))
        .try_map(move |_, span: SimpleSpan| {
            require(
                level,
                LanguageLevel::Java7,
                "'<>' operator is not allowed for source level below 1.7",
                span,
            )
            .map(|()| Vec::new())
        });
    let creation_ty = class_type(choice((diamond, type_args(ty.clone()))));

    let method_ref_name = choice((
        ident(),
        just(Token::New).to(Identifier::new("new")),
    ));

    recursive(|expr| {
        let args = expr
            .clone()
            .separated_by(just(Token::Comma))
            .collect::<Vec<_>>()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
            .boxed();

        let literal = select! {
            Token::IntLit(s) => Literal::Int(s),
            Token::FloatLit(s) => Literal::Float(s),
            Token::CharLit(s) => Literal::Char(s),
            Token::StringLit(s) => Literal::String(s),
            Token::True => Literal::Bool(true),
            Token::False => Literal::Bool(false),
            Token::Null => Literal::Null,
        }
        .try_map(move |literal, span: SimpleSpan| {
            if let Literal::Int(text) | Literal::Float(text) = &literal {
                if text.starts_with("0b") || text.starts_with("0B") {
                    require(
                        level,
                        LanguageLevel::Java7,
                        "Binary literals can only be used with source level 1.7 or greater",
                        span,
                    )?;
                }
                if text.contains('_') {
                    require(
                        level,
                        LanguageLevel::Java7,
                        "Underscores can only be used with source level 1.7 or greater",
                        span,
                    )?;
                }
            }
            Ok(Expr::Literal(literal))
        });

        // new int[n][], new String[] { ... }, new Foo<>(...)
        let sized_array = base_ty
            .clone()
            .then(
                expr.clone()
                    .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
                    .repeated()
                    .at_least(1)
                    .collect::<Vec<_>>(),
            )
            .then(dims())
            .map(|((elem, dims), extra_dims)| Expr::NewArray {
                elem,
                dims,
                extra_dims,
                init: None,
            });

        let initialized_array = base_ty
            .clone()
            .then(dims())
            .then(array_initializer(expr.clone()))
            .try_map(|((elem, extra_dims), items), span: SimpleSpan| {
                if extra_dims == 0 {
                    return Err(Rich::custom(
                        span,
                        "Syntax error, insert \"Dimensions\" to complete ArrayType",
                    ));
                }
                Ok(Expr::NewArray {
                    elem,
                    dims: Vec::new(),
                    extra_dims,
                    init: Some(items),
                })
            });

        // An anonymous class body cannot declare constructors
        let object = creation_ty
            .clone()
            .then(args.clone())
            .then(class_body.clone().or_not())
            .try_map(|((ty, args), body), _span: SimpleSpan| {
                let constructor = body
                    .iter()
                    .flatten()
                    .find(|member| matches!(member.node, Member::Constructor(_)));
                if let Some(member) = constructor {
                    return Err(Rich::custom(
                        SimpleSpan::from(member.span.clone()),
                        "Return type for the method is missing",
                    ));
                }
                Ok((ty, args, body))
            })
            .boxed();

        let creation = just(Token::New)
            .ignore_then(choice((
                sized_array,
                initialized_array,
                object.clone().map(|(ty, args, body)| Expr::New {
                    outer: None,
                    ty,
                    args,
                    body,
                }),
            )))
            .boxed();

        let explicit_ctor_call = choice((
            just(Token::This).to("this"),
            just(Token::Super).to("super"),
        ))
        .then(args.clone())
        .map(|(name, args)| Expr::Call {
            target: None,
            type_args: Vec::new(),
            name: Identifier::new(name),
            args,
        });

        let class_literal = ty
            .clone()
            .then_ignore(just(Token::Dot))
            .then_ignore(just(Token::Class))
            .map(Expr::ClassLit);

        // `String[]::new`, `List<T>::size`; a plain name goes through the selectors
        let type_method_ref = ty
            .clone()
            .then_ignore(just(Token::ColonColon))
            .then(method_ref_name.clone())
            .try_map(move |(ty, name), span: SimpleSpan| {
                let written_as_type = match &ty {
                    TypeRef::Array(_) => true,
                    TypeRef::Class(segments) => segments.iter().any(|s| !s.args.is_empty()),
                    TypeRef::Primitive(_) => false,
                };
                if !written_as_type {
                    return Err(Rich::custom(span, "Syntax error on token \"::\""));
                }
                require(
                    level,
                    LanguageLevel::Java8,
                    "Method references are allowed only at source level 1.8 or above",
                    span,
                )?;
                Ok(Expr::TypeMethodRef { ty, name })
            });

        let name_or_call = ident().then(args.clone().or_not()).map(|(name, args)| match args {
            Some(args) => Expr::Call {
                target: None,
                type_args: Vec::new(),
                name,
                args,
            },
            None => Expr::Name(name),
        });

        let primary = choice((
            literal,
            expr.clone()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
            creation,
            explicit_ctor_call,
            just(Token::This).to(Expr::This),
            just(Token::Super).to(Expr::Super),
            class_literal,
            type_method_ref,
            name_or_call,
        ))
        .boxed();

        let selector = choice((
            just(Token::Dot)
                .ignore_then(type_args(ty.clone()))
                .then(ident())
                .then(args.clone())
                .map(|((type_args, name), args)| Selector::GenericCall(type_args, name, args)),
            just(Token::Dot)
                .ignore_then(ident())
                .then(args.clone().or_not())
                .map(|(name, args)| Selector::Member(name, args)),
            just(Token::Dot)
                .then(just(Token::This))
                .to(Selector::This),
            just(Token::Dot)
                .then(just(Token::Super))
                .to(Selector::Super),
            just(Token::Dot)
                .then(just(Token::New))
                .ignore_then(object)
                .map(Selector::Creation),
            expr.clone()
                .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
                .map(Selector::Index),
            just(Token::ColonColon)
                .ignore_then(method_ref_name.clone())
                .map(Selector::MethodRef),
        ))
        .boxed();

        let postfix_op = select! {
            Token::PlusPlus => PostfixOp::Inc,
            Token::MinusMinus => PostfixOp::Dec,
        };

        let postfix = primary
            .then(selector.repeated().collect::<Vec<_>>())
            .try_map(move |(base, selectors), span: SimpleSpan| {
                apply_selectors(base, selectors, level, span)
            })
            .then(postfix_op.repeated().collect::<Vec<_>>())
            .map(|(expr, ops)| {
                ops.into_iter().fold(expr, |expr, op| Expr::Postfix {
                    op,
                    expr: Box::new(expr),
                })
            })
            .boxed();

        let unary = recursive(|unary| {
            let prefix = select! {
                Token::Plus => UnaryOp::Plus,
                Token::Minus => UnaryOp::Minus,
                Token::Bang => UnaryOp::Not,
                Token::Tilde => UnaryOp::BitNot,
                Token::PlusPlus => UnaryOp::PreInc,
                Token::MinusMinus => UnaryOp::PreDec,
            }
            .then(unary.clone())
            .map(|(op, expr)| Expr::Unary {
                op,
                expr: Box::new(expr),
            });

            // `(a) + b` is a binary expression, not a cast of `+b`
            let cast = ty
                .clone()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
                .then(unary)
                .try_map(|(ty, expr), span: SimpleSpan| match (&ty, &expr) {
                    (TypeRef::Primitive(_), _) => Ok(Expr::Cast {
                        ty,
                        expr: Box::new(expr),
                    }),
                    (
                        _,
                        Expr::Unary {
                            op: UnaryOp::Plus | UnaryOp::Minus | UnaryOp::PreInc | UnaryOp::PreDec,
                            ..
                        },
                    ) => Err(Rich::custom(span, "Syntax error on token \")\"")),
                    _ => Ok(Expr::Cast {
                        ty,
                        expr: Box::new(expr),
                    }),
                });

            choice((prefix, cast, postfix)).boxed()
        });

        let multiplicative = binary_level(
            unary,
            select! {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Rem,
            },
        );
        let additive = binary_level(
            multiplicative,
            select! {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
            },
        );

        // `>>` and `>>>` arrive as adjacent `>` tokens so generics can close
        let gt = just(Token::Greater).map_with(|_, e| span_range(&e.span()));
        let shift_op = choice((
            just(Token::Shl).to(BinaryOp::Shl),
            gt.clone()
                .then(gt.clone())
                .then(gt.clone())
                .try_map(|((a, b), c), span: SimpleSpan| {
                    if a.end == b.start && b.end == c.start {
                        Ok(BinaryOp::Ushr)
                    } else {
                        Err(Rich::custom(span, "Syntax error on token \">\""))
                    }
                }),
            gt.clone().then(gt).try_map(|(a, b), span: SimpleSpan| {
                if a.end == b.start {
                    Ok(BinaryOp::Shr)
                } else {
                    Err(Rich::custom(span, "Syntax error on token \">\""))
                }
            }),
        ));
        let shift = binary_level(additive, shift_op);

        let relational = shift
            .clone()
            .then(
                choice((
                    select! {
                        Token::Less => BinaryOp::Less,
                        Token::Greater => BinaryOp::Greater,
                        Token::LessEq => BinaryOp::LessEq,
                        Token::GreaterEq => BinaryOp::GreaterEq,
                    }
                    .then(shift)
                    .map(|(op, rhs)| Relation::Compare(op, rhs)),
                    just(Token::Instanceof)
                        .ignore_then(ty.clone())
                        .map(Relation::InstanceOf),
                ))
                .repeated()
                .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| {
                rest.into_iter().fold(first, |lhs, relation| match relation {
                    Relation::Compare(op, rhs) => Expr::Binary {
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    Relation::InstanceOf(ty) => Expr::InstanceOf {
                        expr: Box::new(lhs),
                        ty,
                    },
                })
            })
            .boxed();

        let equality = binary_level(
            relational,
            select! {
                Token::EqEq => BinaryOp::Eq,
                Token::NotEq => BinaryOp::NotEq,
            },
        );
        let bit_and = binary_level(equality, just(Token::Amp).to(BinaryOp::BitAnd));
        let bit_xor = binary_level(bit_and, just(Token::Caret).to(BinaryOp::BitXor));
        let bit_or = binary_level(bit_xor, just(Token::Pipe).to(BinaryOp::BitOr));
        let and = binary_level(bit_or, just(Token::AndAnd).to(BinaryOp::And));
        let or = binary_level(and, just(Token::OrOr).to(BinaryOp::Or));

        let conditional = or
            .then(
                just(Token::Question)
                    .ignore_then(expr.clone())
                    .then_ignore(just(Token::Colon))
                    .then(expr.clone())
                    .or_not(),
            )
            .map(|(cond, branches)| match branches {
                Some((then, otherwise)) => Expr::Conditional {
                    cond: Box::new(cond),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise),
                },
                None => cond,
            })
            .boxed();

        let assign_op = select! {
            Token::Assign => AssignOp::Assign,
            Token::PlusAssign => AssignOp::Add,
            Token::MinusAssign => AssignOp::Sub,
            Token::StarAssign => AssignOp::Mul,
            Token::SlashAssign => AssignOp::Div,
            Token::PercentAssign => AssignOp::Rem,
            Token::AmpAssign => AssignOp::And,
            Token::PipeAssign => AssignOp::Or,
            Token::CaretAssign => AssignOp::Xor,
            Token::ShlAssign => AssignOp::Shl,
            Token::ShrAssign => AssignOp::Shr,
            Token::UshrAssign => AssignOp::Ushr,
        };

        let assignment = conditional
            .then(assign_op.then(expr.clone()).or_not())
            .try_map(|(target, rhs), span: SimpleSpan| match rhs {
                None => Ok(target),
                Some((op, value)) => match target {
                    Expr::Name(_) | Expr::Field { .. } | Expr::Index { .. } => Ok(Expr::Assign {
                        op,
                        target: Box::new(target),
                        value: Box::new(value),
                    }),
                    _ => Err(Rich::custom(
                        span,
                        "The left-hand side of an assignment must be a variable",
                    )),
                },
            })
            .boxed();

        let lambda_params = choice((
            ident().map(|param| vec![param]),
            ident()
                .separated_by(just(Token::Comma))
                .collect::<Vec<_>>()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
            just(Token::Final)
                .or_not()
                .ignore_then(ty.clone())
                .ignore_then(ident())
                .separated_by(just(Token::Comma))
                .at_least(1)
                .collect::<Vec<_>>()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
        ));

        let lambda_body = choice((
            block.clone().map(LambdaBody::Block),
            expr.clone().map(|body| LambdaBody::Expr(Box::new(body))),
        ));

        let lambda = lambda_params
            .then_ignore(just(Token::Arrow))
            .then(lambda_body)
            .try_map(move |(params, body), span: SimpleSpan| {
                require(
                    level,
                    LanguageLevel::Java8,
                    "Lambda expressions are allowed only at source level 1.8 or above",
                    span,
                )?;
                Ok(Expr::Lambda { params, body })
            })
            .boxed();

        choice((lambda, assignment)).boxed()
    })
}

/// Build the compilation-unit and statement-list parsers for one source level.
///
/// Statements, expressions and class bodies nest inside each other: lambdas hold blocks,
/// anonymous classes hold members, and blocks hold local classes.
fn java_grammar<'a, I>(
    level: LanguageLevel,
) -> (
    impl Parser<'a, I, CompilationUnit, ParserExtra<'a>> + Clone,
    impl Parser<'a, I, Vec<Spanned<Stmt>>, ParserExtra<'a>> + Clone,
)
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let mut stmt: Recursive<Indirect<'a, 'a, I, Spanned<Stmt>, ParserExtra<'a>>> =
        Recursive::declare();
    let mut class_body: Recursive<Indirect<'a, 'a, I, Vec<Spanned<Member>>, ParserExtra<'a>>> =
        Recursive::declare();

    let block = stmt
        .clone()
        .repeated()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::BraceOpen), just(Token::BraceClose))
        .map(|stmts| Block { stmts })
        .boxed();

    let ty = type_ref();
    let class_ty = class_type(type_args(ty.clone()));
    let expr = expression(level, block.clone(), class_body.clone());

    let var_init = choice((
        array_initializer(expr.clone()).map(Expr::ArrayInit),
        expr.clone(),
    ));
    let declarator = spanned_ident()
        .then(dims())
        .then(just(Token::Assign).ignore_then(var_init.clone()).or_not())
        .map(|((name, dims), init)| Declarator { name, dims, init });
    let declarators = declarator
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect::<Vec<_>>();

    let local_var = just(Token::Final)
        .or_not()
        .then(ty.clone())
        .then(declarators.clone())
        .map(|((is_final, ty), declarators)| LocalVarDecl {
            is_final: is_final.is_some(),
            ty,
            declarators,
        });

    let paren_expr = expr
        .clone()
        .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

    let annotation = just(Token::At)
        .ignore_then(qualified_name())
        .then(
            var_init
                .separated_by(just(Token::Comma))
                .collect::<Vec<_>>()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
                .or_not(),
        )
        .map(|(name, args)| Annotation {
            name,
            args: args.unwrap_or_default(),
        });

    let modifier = choice((
        select! {
            Token::Public => Modifier::Public,
            Token::Protected => Modifier::Protected,
            Token::Private => Modifier::Private,
            Token::Static => Modifier::Static,
            Token::Final => Modifier::Final,
            Token::Abstract => Modifier::Abstract,
            Token::Native => Modifier::Native,
            Token::Synchronized => Modifier::Synchronized,
            Token::Transient => Modifier::Transient,
            Token::Volatile => Modifier::Volatile,
            Token::Strictfp => Modifier::Strictfp,
            Token::Default => Modifier::Default,
        },
        annotation.map(Modifier::Annotation),
    ));
    let modifiers = modifier.repeated().collect::<Vec<_>>();

    let type_param = ident()
        .then(
            just(Token::Extends)
                .ignore_then(
                    class_ty
                        .clone()
                        .separated_by(just(Token::Amp))
                        .at_least(1)
                        .collect::<Vec<_>>(),
                )
                .or_not(),
        )
        .map(|(name, bounds)| TypeParam {
            name,
            bounds: bounds.unwrap_or_default(),
        });
    let type_params = type_param
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect::<Vec<_>>()
        .delimited_by(just(Token::Less), just(Token::Greater))
        .or_not()
        .map(|params| params.unwrap_or_default());

    let param = modifiers
        .clone()
        .then(ty.clone())
        .then(just(Token::Ellipsis).or_not())
        .then(spanned_ident())
        .then(dims())
        .map(|((((modifiers, ty), varargs), name), dims)| Param {
            is_final: modifiers.contains(&Modifier::Final),
            ty,
            varargs: varargs.is_some(),
            name,
            dims,
        });
    let params = param
        .separated_by(just(Token::Comma))
        .collect::<Vec<_>>()
        .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

    let throws = just(Token::Throws)
        .ignore_then(
            class_ty
                .clone()
                .separated_by(just(Token::Comma))
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .or_not()
        .map(|types| types.unwrap_or_default());

    let result_type = choice((
        just(Token::Void).to(ResultType::Void),
        ty.clone().map(ResultType::Type),
    ));

    let method = modifiers
        .clone()
        .then(type_params.clone())
        .then(result_type)
        .then(spanned_ident())
        .then(params.clone())
        .then(dims())
        .then(throws.clone())
        .then(choice((
            block.clone().map(Some),
            just(Token::Semicolon).to(None),
        )))
        .map(
            |(((((((modifiers, type_params), result), name), params), extra_dims), throws), body)| {
                let result = match result {
                    ResultType::Type(ty) => ResultType::Type(TypeRef::array_of(ty, extra_dims)),
                    ResultType::Void => ResultType::Void,
                };
                MethodDecl {
                    modifiers,
                    type_params,
                    result,
                    name,
                    params,
                    throws,
                    body,
                }
            },
        )
        .boxed();

    let constructor = modifiers
        .clone()
        .then_ignore(type_params.clone())
        .then(spanned_ident())
        .then(params)
        .then(throws)
        .then(block.clone())
        .map(|((((modifiers, name), params), throws), body)| ConstructorDecl {
            modifiers,
            name,
            params,
            throws,
            body,
        });

    let field = modifiers
        .clone()
        .then(ty.clone())
        .then(declarators)
        .then_ignore(just(Token::Semicolon))
        .map(|((modifiers, ty), declarators)| FieldDecl {
            modifiers,
            ty,
            declarators,
        })
        .boxed();

    let kind = choice((
        just(Token::Class).to(ClassKind::Class),
        just(Token::Interface).to(ClassKind::Interface),
    ));

    let supertypes = class_ty
        .clone()
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect::<Vec<_>>();

    let class_decl = modifiers
        .clone()
        .then(kind)
        .then(spanned_ident())
        .then(type_params.clone())
        .then(just(Token::Extends).ignore_then(supertypes.clone()).or_not())
        .then(just(Token::Implements).ignore_then(supertypes).or_not())
        .then(class_body.clone())
        .try_map(
            |((((((modifiers, kind), name), type_params), extends), implements), members),
             _span: SimpleSpan| {
                // A constructor named after something else is a method missing its type
                let misnamed = members.iter().find(|m| {
                    matches!(&m.node, Member::Constructor(c) if c.name.node != name.node)
                });
                if let Some(member) = misnamed {
                    return Err(Rich::custom(
                        SimpleSpan::from(member.span.clone()),
                        "Return type for the method is missing",
                    ));
                }
                Ok(ClassDecl {
                    modifiers,
                    kind,
                    name,
                    type_params,
                    extends: extends.unwrap_or_default(),
                    implements: implements.unwrap_or_default(),
                    members,
                })
            },
        )
        .boxed();

    let initializer = just(Token::Static)
        .or_not()
        .then(block.clone())
        .map(|(is_static, body)| Member::Initializer {
            is_static: is_static.is_some(),
            body,
        });

    class_body.define(
        choice((
            class_decl.clone().map(Member::Class),
            initializer,
            constructor.map(Member::Constructor),
            method.clone().map(Member::Method),
            field.clone().map(Member::Field),
        ))
        .map_with(|member, e| Spanned::new(member, span_range(&e.span())))
        .repeated()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::BraceOpen), just(Token::BraceClose))
        .boxed(),
    );

    let nested = stmt.clone().map(Box::new);

    let if_stmt = just(Token::If)
        .ignore_then(paren_expr.clone())
        .then(nested.clone())
        .then(just(Token::Else).ignore_then(nested.clone()).or_not())
        .map(|((cond, then), otherwise)| Stmt::If {
            cond,
            then,
            otherwise,
        });

    let while_stmt = just(Token::While)
        .ignore_then(paren_expr.clone())
        .then(nested.clone())
        .map(|(cond, body)| Stmt::While { cond, body });

    let do_stmt = just(Token::Do)
        .ignore_then(nested.clone())
        .then_ignore(just(Token::While))
        .then(paren_expr.clone())
        .then_ignore(just(Token::Semicolon))
        .map(|(body, cond)| Stmt::DoWhile { body, cond });

    let for_each = just(Token::Final)
        .or_not()
        .then(ty.clone())
        .then(spanned_ident())
        .then_ignore(just(Token::Colon))
        .then(expr.clone())
        .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
        .then(nested.clone())
        .map(|((((is_final, ty), name), iterable), body)| Stmt::ForEach {
            is_final: is_final.is_some(),
            ty,
            name,
            iterable,
            body,
        });

    let for_init = choice((
        local_var.clone().map(ForInit::LocalVar),
        expr.clone()
            .separated_by(just(Token::Comma))
            .at_least(1)
            .collect::<Vec<_>>()
            .map(ForInit::Exprs),
    ));

    let for_classic = for_init
        .or_not()
        .then_ignore(just(Token::Semicolon))
        .then(expr.clone().or_not())
        .then_ignore(just(Token::Semicolon))
        .then(
            expr.clone()
                .separated_by(just(Token::Comma))
                .collect::<Vec<_>>(),
        )
        .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
        .then(nested.clone())
        .map(|(((init, cond), update), body)| Stmt::For {
            init,
            cond,
            update,
            body,
        });

    let for_stmt = just(Token::For).ignore_then(choice((for_each, for_classic)));

    let switch_label = choice((
        just(Token::Case).ignore_then(expr.clone()).map(Some),
        just(Token::Default).to(None),
    ))
    .then_ignore(just(Token::Colon));

    let switch_group = switch_label
        .then(stmt.clone().repeated().collect::<Vec<_>>())
        .map(|(label, body)| SwitchGroup { label, body });

    let switch_stmt = just(Token::Switch)
        .ignore_then(paren_expr.clone())
        .then(
            switch_group
                .repeated()
                .collect::<Vec<_>>()
                .delimited_by(just(Token::BraceOpen), just(Token::BraceClose)),
        )
        .map(|(selector, groups)| Stmt::Switch { selector, groups });

    let return_stmt = just(Token::Return)
        .ignore_then(expr.clone().or_not())
        .then_ignore(just(Token::Semicolon))
        .map(Stmt::Return);

    let break_stmt = just(Token::Break)
        .ignore_then(ident().or_not())
        .then_ignore(just(Token::Semicolon))
        .map(Stmt::Break);

    let continue_stmt = just(Token::Continue)
        .ignore_then(ident().or_not())
        .then_ignore(just(Token::Semicolon))
        .map(Stmt::Continue);

    let throw_stmt = just(Token::Throw)
        .ignore_then(expr.clone())
        .then_ignore(just(Token::Semicolon))
        .map(Stmt::Throw);

    let assert_stmt = just(Token::Assert)
        .ignore_then(expr.clone())
        .then(just(Token::Colon).ignore_then(expr.clone()).or_not())
        .then_ignore(just(Token::Semicolon))
        .map(|(cond, message)| Stmt::Assert { cond, message });

    let labeled_stmt = ident()
        .then_ignore(just(Token::Colon))
        .then(nested.clone())
        .map(|(label, body)| Stmt::Labeled { label, body });

    let catch_types = class_ty
        .clone()
        .separated_by(just(Token::Pipe))
        .at_least(1)
        .collect::<Vec<_>>()
        .try_map(move |types, span: SimpleSpan| {
            if types.len() > 1 {
                require(
                    level,
                    LanguageLevel::Java7,
                    "Multi-catch parameters are not allowed for source level below 1.7",
                    span,
                )?;
            }
            Ok(types)
        });

    let catch_clause = just(Token::Catch)
        .ignore_then(
            just(Token::Final)
                .or_not()
                .ignore_then(catch_types)
                .then(spanned_ident())
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
        )
        .then(block.clone())
        .map(|((types, name), body)| CatchClause { types, name, body });

    let resource = just(Token::Final)
        .or_not()
        .then(ty.clone())
        .then(spanned_ident())
        .then_ignore(just(Token::Assign))
        .then(expr.clone())
        .map(|(((is_final, ty), name), init)| Resource {
            is_final: is_final.is_some(),
            ty,
            name,
            init,
        });

    let resources = resource
        .separated_by(just(Token::Semicolon))
        .allow_trailing()
        .at_least(1)
        .collect::<Vec<_>>()
        .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
        .try_map(move |resources, span: SimpleSpan| {
            require(
                level,
                LanguageLevel::Java7,
                "Resource specification not allowed here for source level below 1.7",
                span,
            )
            .map(|()| resources)
        });

    let try_stmt = just(Token::Try)
        .ignore_then(resources.or_not())
        .then(block.clone())
        .then(catch_clause.repeated().collect::<Vec<_>>())
        .then(just(Token::Finally).ignore_then(block.clone()).or_not())
        .try_map(|(((resources, body), catches), finally), span: SimpleSpan| {
            let resources = resources.unwrap_or_default();
            if resources.is_empty() && catches.is_empty() && finally.is_none() {
                return Err(Rich::custom(
                    span,
                    "Syntax error, insert \"Finally\" to complete TryStatement",
                ));
            }
            Ok(Stmt::Try {
                resources,
                body,
                catches,
                finally,
            })
        });

    let synchronized_stmt = just(Token::Synchronized)
        .ignore_then(paren_expr)
        .then(block.clone())
        .map(|(lock, body)| Stmt::Synchronized { lock, body });

    // Only `abstract`, `final`, `strictfp` and annotations may precede a local class
    let local_class = class_decl.clone().try_map(|class, span: SimpleSpan| {
        if class.kind == ClassKind::Interface {
            return Err(Rich::custom(
                span,
                format!(
                    "The member interface {} can only be defined inside a top-level class or interface",
                    class.name.node
                ),
            ));
        }
        let illegal = class.modifiers.iter().any(|m| {
            matches!(
                m,
                Modifier::Public | Modifier::Protected | Modifier::Private | Modifier::Static
            )
        });
        if illegal {
            return Err(Rich::custom(
                span,
                format!(
                    "Illegal modifier for the local class {}; only abstract or final is permitted",
                    class.name.node
                ),
            ));
        }
        Ok(Stmt::LocalClass(class))
    });

    let local_var_stmt = local_var
        .then_ignore(just(Token::Semicolon))
        .map(Stmt::LocalVar);

    let expr_stmt = expr
        .then_ignore(just(Token::Semicolon))
        .try_map(|expr, span: SimpleSpan| {
            if expr.is_statement_expression() {
                Ok(Stmt::Expr(expr))
            } else {
                Err(Rich::custom(
                    span,
                    "Syntax error, insert \"AssignmentOperator Expression\" to complete Expression",
                ))
            }
        });

    stmt.define(
        choice((
            block.map(Stmt::Block),
            if_stmt,
            while_stmt,
            do_stmt,
            for_stmt,
            switch_stmt,
            return_stmt,
            break_stmt,
            continue_stmt,
            throw_stmt,
            assert_stmt,
            try_stmt,
            synchronized_stmt,
            just(Token::Semicolon).to(Stmt::Empty),
            local_class,
            labeled_stmt,
            local_var_stmt,
            expr_stmt,
        ))
        .map_with(|stmt, e| Spanned::new(stmt, span_range(&e.span())))
        .boxed(),
    );

    let package = just(Token::Package)
        .ignore_then(qualified_name())
        .then_ignore(just(Token::Semicolon));

    let import = just(Token::Import)
        .ignore_then(just(Token::Static).or_not())
        .then(qualified_name())
        .then(just(Token::Dot).then(just(Token::Star)).or_not())
        .then_ignore(just(Token::Semicolon))
        .map(|((is_static, path), wildcard)| ImportDecl {
            is_static: is_static.is_some(),
            path,
            wildcard: wildcard.is_some(),
        });

    // Members outside any class are accepted so member-level fragments parse as units
    let item = choice((
        class_decl.map(Item::Class),
        method.map(|m| Item::Member(Member::Method(m))),
        field.map(|f| Item::Member(Member::Field(f))),
    ))
    .map_with(|item, e| Spanned::new(item, span_range(&e.span())));

    let unit = package
        .or_not()
        .then(import.repeated().collect::<Vec<_>>())
        .then(item.repeated().collect::<Vec<_>>())
        .then_ignore(end())
        .map(|((package, imports), items)| CompilationUnit {
            package,
            imports,
            items,
        });

    let statements = stmt.repeated().collect::<Vec<_>>().then_ignore(end());

    (unit, statements)
}
