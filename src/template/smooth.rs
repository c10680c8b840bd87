//! Error smoothing: replaces placeholders with stand-ins so editors can check the code

use std::collections::HashMap;
use std::ops::Range;

use tracing::debug;

use crate::config::LanguageLevel;
use crate::oracle::SyntaxOracle;
use crate::template::model::{
    take_identifier, Category, Placeholder, ReturnKind, Template, TypeDescriptor,
};
use crate::template::render::render;
use crate::template::resolver::{resolve_value_type, HOLE};

/// Identifier substituted for unrelated placeholders on a line under resolution
pub const SLOT: &str = "__template_slot__";

/// Byte range of the line containing `offset`, without its newline
fn line_around(code: &str, offset: usize) -> Range<usize> {
    let start = code[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = code[offset..].find('\n').map_or(code.len(), |i| offset + i);
    start..end
}

struct Smoother<'a, O: ?Sized> {
    oracle: &'a O,
    template: &'a Template,
    placeholders: Vec<Placeholder>,
    level: LanguageLevel,
}

impl<'a, O> Smoother<'a, O>
where
    O: SyntaxOracle + ?Sized,
{
    fn category_of(&self, name: &str) -> Option<Category> {
        self.template.variable(name).and_then(|v| v.category)
    }

    /// Copy `range` of the code, rewriting the placeholders inside it
    fn rewrite(&self, range: Range<usize>, replace: impl Fn(&Placeholder) -> &'static str) -> String {
        let code = self.template.code();
        let mut out = String::new();
        let mut last = range.start;
        for placeholder in self
            .placeholders
            .iter()
            .filter(|p| p.range.start >= range.start && p.range.end <= range.end)
        {
            out.push_str(&code[last..placeholder.range.start]);
            out.push_str(replace(placeholder));
            last = placeholder.range.end;
        }
        out.push_str(&code[last..range.end]);
        out
    }

    /// A return type followed by a name is a declaration: `T name(` is a method, `T name` a field.
    fn return_kind(&self, target: &Placeholder, line: &Range<usize>) -> Option<ReturnKind> {
        let rest = self.rewrite(target.range.end..line.end, |_| SLOT);
        let rest = rest.trim_start();
        let name = take_identifier(rest)?;
        if rest[name.len()..].trim_start().starts_with('(') {
            Some(ReturnKind::Void)
        } else {
            Some(ReturnKind::Object)
        }
    }

    fn value_type(&self, target: &Placeholder, line: Range<usize>) -> Option<TypeDescriptor> {
        let snippet = self.rewrite(line, |p| {
            if p.name == target.name {
                HOLE
            } else if self.category_of(&p.name) == Some(Category::Expr) {
                ""
            } else {
                SLOT
            }
        });
        debug!(variable = %target.name, %snippet, "resolving value type");
        resolve_value_type(self.oracle, &snippet, self.level)
    }

    fn descriptor(&self, name: &str) -> Option<TypeDescriptor> {
        let category = self.category_of(name)?;
        let target = self.placeholders.iter().find(|p| p.name == name)?;
        let line = line_around(self.template.code(), target.range.start);

        match category {
            Category::Args => Some(TypeDescriptor::Args),
            Category::ArgsDef => Some(TypeDescriptor::ArgsDef),
            Category::Expr => Some(TypeDescriptor::Expr),
            Category::Name => Some(TypeDescriptor::Name),
            Category::ReturnType => self
                .return_kind(target, &line)
                .map(TypeDescriptor::ReturnType),
            Category::Value => self.value_type(target, line),
        }
    }

    fn stand_in(&self, name: &str) -> &'static str {
        match self.descriptor(name) {
            Some(descriptor) => render(&descriptor),
            None => {
                debug!(variable = name, "no stand-in resolved");
                ""
            }
        }
    }
}

/// Replace every placeholder of `template` with a stand-in of the right shape.
///
/// Never fails: unknown variables and unresolvable types become empty text, so the
/// result is not guaranteed to parse.
pub fn smooth<O>(oracle: &O, template: &Template, level: LanguageLevel) -> String
where
    O: SyntaxOracle + ?Sized,
{
    let smoother = Smoother {
        oracle,
        template,
        placeholders: template.placeholders(),
        level,
    };

    let code = template.code();
    let mut stand_ins: HashMap<&str, &'static str> = HashMap::new();
    let mut out = String::with_capacity(code.len());
    let mut last = 0;

    for placeholder in &smoother.placeholders {
        out.push_str(&code[last..placeholder.range.start]);
        let stand_in = *stand_ins
            .entry(placeholder.name.as_str())
            .or_insert_with(|| smoother.stand_in(&placeholder.name));
        out.push_str(stand_in);
        last = placeholder.range.end;
    }
    out.push_str(&code[last..]);
    out
}
