//! Value type resolution - finds the declared type a value snippet is assigned to

use crate::config::LanguageLevel;
use crate::oracle::{GrammarContext, LanguageConfig, SyntaxOracle};
use crate::parser::ast::{
    Declarator, Expr, ForInit, LambdaBody, Member, Spanned, Stmt, TypeRef,
};
use crate::template::model::{JavaType, TypeDescriptor};

/// Identifier standing in for the placeholder under resolution
pub const HOLE: &str = "__template_hole__";

/// Walks parsed statements looking for the first construct that gives the hole a type.
///
/// Built fresh for every resolution, so nothing carries over between calls.
#[derive(Debug, Default)]
struct TypeFinder {
    found: Option<TypeRef>,
}

impl TypeFinder {
    fn visit_statements(&mut self, stmts: &[Spanned<Stmt>]) {
        for stmt in stmts {
            if self.found.is_some() {
                return;
            }
            self.visit_stmt(&stmt.node);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::LocalVar(decl) => self.visit_declarators(&decl.ty, &decl.declarators),
            Stmt::LocalClass(class) => self.visit_members(&class.members),
            Stmt::Block(block) => self.visit_statements(&block.stmts),
            Stmt::Expr(expr) | Stmt::Throw(expr) | Stmt::Return(Some(expr)) => {
                self.visit_expr(expr)
            }
            Stmt::Labeled { body, .. } => self.visit_stmt(&body.node),
            Stmt::Assert { cond, message } => {
                self.visit_expr(cond);
                if let Some(message) = message {
                    self.visit_expr(message);
                }
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                self.visit_expr(cond);
                self.visit_stmt(&then.node);
                if let Some(otherwise) = otherwise {
                    self.visit_stmt(&otherwise.node);
                }
            }
            Stmt::While { cond, body } | Stmt::DoWhile { body, cond } => {
                self.visit_expr(cond);
                self.visit_stmt(&body.node);
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => {
                match init {
                    Some(ForInit::LocalVar(decl)) => {
                        self.visit_declarators(&decl.ty, &decl.declarators)
                    }
                    Some(ForInit::Exprs(exprs)) => exprs.iter().for_each(|e| self.visit_expr(e)),
                    None => {}
                }
                if let Some(cond) = cond {
                    self.visit_expr(cond);
                }
                update.iter().for_each(|e| self.visit_expr(e));
                self.visit_stmt(&body.node);
            }
            Stmt::ForEach { iterable, body, .. } => {
                self.visit_expr(iterable);
                self.visit_stmt(&body.node);
            }
            Stmt::Switch { selector, groups } => {
                self.visit_expr(selector);
                for group in groups {
                    self.visit_statements(&group.body);
                }
            }
            Stmt::Try {
                resources,
                body,
                catches,
                finally,
            } => {
                for resource in resources {
                    if self.found.is_some() {
                        return;
                    }
                    if resource.init.mentions(HOLE) {
                        self.found = Some(resource.ty.clone());
                    } else {
                        self.visit_expr(&resource.init);
                    }
                }
                self.visit_statements(&body.stmts);
                for catch in catches {
                    self.visit_statements(&catch.body.stmts);
                }
                if let Some(finally) = finally {
                    self.visit_statements(&finally.stmts);
                }
            }
            Stmt::Synchronized { lock, body } => {
                self.visit_expr(lock);
                self.visit_statements(&body.stmts);
            }
            Stmt::Return(None) | Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty => {}
        }
    }

    /// Local variables and fields share the declarator shape
    fn visit_declarators(&mut self, ty: &TypeRef, declarators: &[Declarator]) {
        for declarator in declarators {
            if self.found.is_some() {
                return;
            }
            if let Some(init) = &declarator.init {
                if init.mentions(HOLE) {
                    // `int x[] = ...` declares an array just like `int[] x`
                    self.found = Some(TypeRef::array_of(ty.clone(), declarator.dims));
                } else {
                    self.visit_expr(init);
                }
            }
        }
    }

    /// Bodies of local and anonymous classes
    fn visit_members(&mut self, members: &[Spanned<Member>]) {
        for member in members {
            if self.found.is_some() {
                return;
            }
            match &member.node {
                Member::Field(field) => self.visit_declarators(&field.ty, &field.declarators),
                Member::Method(method) => {
                    if let Some(body) = &method.body {
                        self.visit_statements(&body.stmts);
                    }
                }
                Member::Constructor(constructor) => {
                    self.visit_statements(&constructor.body.stmts)
                }
                Member::Initializer { body, .. } => self.visit_statements(&body.stmts),
                Member::Class(class) => self.visit_members(&class.members),
            }
        }
    }

    /// Casts outside any declaration, e.g. `use((long) hole);`
    fn visit_expr(&mut self, expr: &Expr) {
        if self.found.is_some() {
            return;
        }
        match expr {
            Expr::Cast { ty, expr } => {
                if expr.mentions(HOLE) {
                    self.found = Some(ty.clone());
                } else {
                    self.visit_expr(expr);
                }
            }
            Expr::Field { target, .. } => self.visit_expr(target),
            Expr::Call { target, args, .. } => {
                if let Some(target) = target {
                    self.visit_expr(target);
                }
                args.iter().for_each(|a| self.visit_expr(a));
            }
            Expr::Index { target, index } => {
                self.visit_expr(target);
                self.visit_expr(index);
            }
            Expr::New {
                outer, args, body, ..
            } => {
                if let Some(outer) = outer {
                    self.visit_expr(outer);
                }
                args.iter().for_each(|a| self.visit_expr(a));
                if let Some(members) = body {
                    self.visit_members(members);
                }
            }
            Expr::NewArray { dims, init, .. } => {
                dims.iter().for_each(|d| self.visit_expr(d));
                if let Some(items) = init {
                    items.iter().for_each(|i| self.visit_expr(i));
                }
            }
            Expr::ArrayInit(items) => items.iter().for_each(|i| self.visit_expr(i)),
            Expr::Unary { expr, .. } | Expr::Postfix { expr, .. } => self.visit_expr(expr),
            Expr::InstanceOf { expr, .. } => self.visit_expr(expr),
            Expr::Binary { lhs, rhs, .. } => {
                self.visit_expr(lhs);
                self.visit_expr(rhs);
            }
            Expr::Assign { target, value, .. } => {
                self.visit_expr(target);
                self.visit_expr(value);
            }
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                self.visit_expr(cond);
                self.visit_expr(then);
                self.visit_expr(otherwise);
            }
            Expr::Lambda { body, .. } => match body {
                LambdaBody::Expr(expr) => self.visit_expr(expr),
                LambdaBody::Block(block) => self.visit_statements(&block.stmts),
            },
            Expr::MethodRef { target, .. }
            | Expr::QualifiedThis(target)
            | Expr::QualifiedSuper(target) => self.visit_expr(target),
            Expr::Literal(_)
            | Expr::Name(_)
            | Expr::This
            | Expr::Super
            | Expr::ClassLit(_)
            | Expr::TypeMethodRef { .. } => {}
        }
    }
}

/// Determine the static type `snippet` gives the hole identifier.
///
/// The snippet is parsed once as statements with recovery enabled. `None` means no
/// type could be determined, which is not an error.
pub fn resolve_value_type<O>(oracle: &O, snippet: &str, level: LanguageLevel) -> Option<TypeDescriptor>
where
    O: SyntaxOracle + ?Sized,
{
    let config = LanguageConfig::new(level).with_statements_recovery(true);
    let outcome = oracle.try_parse(snippet, GrammarContext::Statements, &config);
    if !outcome.is_clean() {
        return None;
    }

    let mut finder = TypeFinder::default();
    finder.visit_statements(outcome.statements()?);
    finder
        .found
        .map(|ty| TypeDescriptor::Value(JavaType::from(&ty)))
}
