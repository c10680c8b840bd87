//! Typed code templates
//!
//! A template is Java source with placeholders such as `<name:Category>`. Each placeholder
//! stands for a fragment of one syntactic category. This module classifies candidate
//! attributes, validates them against the declared categories, substitutes them, and
//! produces stand-in previews of unfilled templates.
//!
//! # Example
//!
//! ```text
//! // Template
//! public <T:ReturnType> <m:Name>(<p:ArgsDef>) {
//!     <body:Expr>
//! }
//!
//! // Smoothed preview
//! public void TemplateName() {
//!
//! }
//! ```

mod classify;
mod fill;
mod model;
mod render;
mod resolver;
mod smooth;
mod translate;
mod validate;

pub use classify::classify;
pub use fill::{fill, GeneratedUnit};
pub use model::{
    Attributes, Category, Classification, DelimiterSyntax, JavaType, Placeholder, ReturnKind,
    Template, TemplateVariable, TypeDescriptor,
};
pub use render::{render, NAME_STAND_IN};
pub use resolver::{resolve_value_type, HOLE};
pub use smooth::{smooth, SLOT};
pub use translate::translate;
pub use validate::validate;
