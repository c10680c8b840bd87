//! Neutral stand-ins for resolved placeholders

use crate::parser::ast::PrimitiveType;
use crate::template::model::{JavaType, ReturnKind, TypeDescriptor};

/// Identifier used for every `Name` placeholder, so class and constructor names agree
pub const NAME_STAND_IN: &str = "TemplateName";

/// Default literal for a value of type `ty`
fn default_value(ty: &JavaType) -> &'static str {
    match ty {
        JavaType::Primitive(p) => match p {
            PrimitiveType::Boolean => "false",
            PrimitiveType::Char => "' '",
            PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Int => "0",
            PrimitiveType::Long => "0L",
            PrimitiveType::Float => "0.0f",
            PrimitiveType::Double => "0.0",
        },
        ty if ty.is_string() => "\"\"",
        JavaType::Reference(_) | JavaType::Array(_) => "null",
    }
}

/// Source text that keeps the surrounding code well-formed where `descriptor` is expected
pub fn render(descriptor: &TypeDescriptor) -> &'static str {
    match descriptor {
        TypeDescriptor::Args | TypeDescriptor::ArgsDef | TypeDescriptor::Expr => "",
        TypeDescriptor::Name => NAME_STAND_IN,
        TypeDescriptor::ReturnType(ReturnKind::Void) => "void",
        TypeDescriptor::ReturnType(ReturnKind::Object) => "Object",
        TypeDescriptor::Value(ty) => default_value(ty),
    }
}
