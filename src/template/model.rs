//! Template values: placeholders, categories and type descriptors

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::parser::ast::{PrimitiveType, TypeRef};

/// Placeholder name to literal replacement text
pub type Attributes = HashMap<String, String>;

/// Syntactic role a code fragment can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Argument list of a call
    Args,
    /// Parameter list of a method declaration
    ArgsDef,
    /// Statements
    Expr,
    /// Identifier naming a class or member
    Name,
    /// Method return type
    ReturnType,
    /// Initializer expression
    Value,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Args,
        Category::ArgsDef,
        Category::Expr,
        Category::Name,
        Category::ReturnType,
        Category::Value,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Args => "ARGS",
            Category::ArgsDef => "ARGSDEF",
            Category::Expr => "EXPR",
            Category::Name => "NAME",
            Category::ReturnType => "RETURNTYPE",
            Category::Value => "VALUE",
        }
    }

    /// Parse a placeholder annotation, ignoring case
    pub fn from_annotation(annotation: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(annotation))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_annotation(s.trim()).ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Set of categories a snippet can inhabit. Empty means the snippet fits nowhere.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification(BTreeSet<Category>);

impl Classification {
    pub fn new() -> Self {
        Self::default()
    }

    /// What a blank snippet inhabits: an empty argument list, parameter list or statement list
    pub fn blank() -> Self {
        [Category::Args, Category::ArgsDef, Category::Expr]
            .into_iter()
            .collect()
    }

    pub fn insert(&mut self, category: Category) -> bool {
        self.0.insert(category)
    }

    pub fn contains(&self, category: Category) -> bool {
        self.0.contains(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Category> for Classification {
    fn from_iter<T: IntoIterator<Item = Category>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Category::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// A named, typed slot in a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVariable {
    pub name: Option<String>,
    pub category: Option<Category>,
}

impl TemplateVariable {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: Some(name.into()),
            category: Some(category),
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            category: None,
        }
    }

    pub fn unnamed(category: Option<Category>) -> Self {
        Self {
            name: None,
            category,
        }
    }
}

/// Markers around a placeholder: `<open><name><separator><category><close>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterSyntax {
    pub open: String,
    pub separator: String,
    pub close: String,
}

impl Default for DelimiterSyntax {
    fn default() -> Self {
        Self {
            open: "<".to_string(),
            separator: ":".to_string(),
            close: ">".to_string(),
        }
    }
}

/// One placeholder occurrence in template code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Byte range of the whole occurrence, markers included
    pub range: Range<usize>,
    pub name: String,
    /// Category text as written, possibly empty
    pub annotation: String,
    pub category: Option<Category>,
}

impl DelimiterSyntax {
    pub fn new(
        open: impl Into<String>,
        separator: impl Into<String>,
        close: impl Into<String>,
    ) -> Result<Self, String> {
        let syntax = Self {
            open: open.into(),
            separator: separator.into(),
            close: close.into(),
        };
        if syntax.open.is_empty() || syntax.separator.is_empty() || syntax.close.is_empty() {
            return Err("open, separator and close markers must be non-empty".to_string());
        }
        Ok(syntax)
    }

    /// Find every placeholder in `code`, left to right.
    ///
    /// Only `open identifier separator identifier? close` counts, so generic types such as
    /// `Map<K, V>` pass through untouched.
    pub fn scan(&self, code: &str) -> Vec<Placeholder> {
        let mut found = Vec::new();
        if self.open.is_empty() {
            return found;
        }

        let mut pos = 0;
        while let Some(offset) = code[pos..].find(&self.open) {
            let start = pos + offset;
            match self.match_at(code, start) {
                Some(placeholder) => {
                    pos = placeholder.range.end;
                    found.push(placeholder);
                }
                None => pos = start + self.open.len(),
            }
        }
        found
    }

    fn match_at(&self, code: &str, start: usize) -> Option<Placeholder> {
        let mut cursor = start + self.open.len();

        let name = take_identifier(&code[cursor..])?;
        cursor += name.len();

        if !code[cursor..].starts_with(&self.separator) {
            return None;
        }
        cursor += self.separator.len();

        let annotation = take_identifier(&code[cursor..]).unwrap_or("");
        cursor += annotation.len();

        if !code[cursor..].starts_with(&self.close) {
            return None;
        }
        cursor += self.close.len();

        Some(Placeholder {
            range: start..cursor,
            name: name.to_string(),
            annotation: annotation.to_string(),
            category: Category::from_annotation(annotation),
        })
    }
}

/// Longest Java identifier at the start of `text`
pub(crate) fn take_identifier(text: &str) -> Option<&str> {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return None,
    }
    let end = chars
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == '$'))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    Some(&text[..end])
}

/// Placeholder-bearing source code. The engine only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    code: String,
    delimiters: DelimiterSyntax,
    variables: Vec<TemplateVariable>,
}

impl Template {
    pub fn new(
        code: impl Into<String>,
        delimiters: DelimiterSyntax,
        variables: Vec<TemplateVariable>,
    ) -> Self {
        Self {
            code: code.into(),
            delimiters,
            variables,
        }
    }

    /// Extract the variables of `code` using the default `<name:Category>` markers
    pub fn from_source(code: impl Into<String>) -> Self {
        Self::with_delimiters(code, DelimiterSyntax::default())
    }

    /// Extract the variables of `code`, in order of first occurrence.
    ///
    /// A later occurrence only contributes a category when the earlier ones carried none.
    pub fn with_delimiters(code: impl Into<String>, delimiters: DelimiterSyntax) -> Self {
        let code = code.into();
        let mut variables: Vec<TemplateVariable> = Vec::new();

        for placeholder in delimiters.scan(&code) {
            let existing = variables
                .iter_mut()
                .find(|v| v.name.as_deref() == Some(placeholder.name.as_str()));
            match existing {
                Some(variable) => {
                    if variable.category.is_none() {
                        variable.category = placeholder.category;
                    }
                }
                None => variables.push(TemplateVariable {
                    name: Some(placeholder.name),
                    category: placeholder.category,
                }),
            }
        }

        Self {
            code,
            delimiters,
            variables,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn delimiters(&self) -> &DelimiterSyntax {
        &self.delimiters
    }

    pub fn variables(&self) -> &[TemplateVariable] {
        &self.variables
    }

    pub fn placeholders(&self) -> Vec<Placeholder> {
        self.delimiters.scan(&self.code)
    }

    /// First variable declared under `name`
    pub fn variable(&self, name: &str) -> Option<&TemplateVariable> {
        self.variables
            .iter()
            .find(|v| v.name.as_deref() == Some(name))
    }
}

/// Return type stand-in chosen from the surrounding declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    Void,
    Object,
}

/// Static type of a value expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JavaType {
    Primitive(PrimitiveType),
    /// Class or interface type as written, e.g. `java.util.List<String>`
    Reference(String),
    Array(Box<JavaType>),
}

impl JavaType {
    pub fn is_string(&self) -> bool {
        matches!(self, JavaType::Reference(name) if name == "String" || name == "java.lang.String")
    }
}

impl From<&TypeRef> for JavaType {
    fn from(ty: &TypeRef) -> Self {
        match ty {
            TypeRef::Primitive(p) => JavaType::Primitive(*p),
            TypeRef::Array(elem) => JavaType::Array(Box::new(JavaType::from(elem.as_ref()))),
            TypeRef::Class(_) => JavaType::Reference(ty.to_string()),
        }
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Primitive(p) => f.write_str(p.keyword()),
            JavaType::Reference(name) => f.write_str(name),
            JavaType::Array(elem) => write!(f, "{}[]", elem),
        }
    }
}

/// Resolved type of a placeholder, one variant per category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Args,
    ArgsDef,
    Expr,
    Name,
    ReturnType(ReturnKind),
    Value(JavaType),
}

impl TypeDescriptor {
    pub fn category(&self) -> Category {
        match self {
            TypeDescriptor::Args => Category::Args,
            TypeDescriptor::ArgsDef => Category::ArgsDef,
            TypeDescriptor::Expr => Category::Expr,
            TypeDescriptor::Name => Category::Name,
            TypeDescriptor::ReturnType(_) => Category::ReturnType,
            TypeDescriptor::Value(_) => Category::Value,
        }
    }
}
