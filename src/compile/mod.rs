//! Compile the template source into a tree that can be walked by the renderer.
//!
//! This process has two stages:
//! - The lexer chunks the template source into tokens.
//! - The parser constructs the tree from the token stream.

mod lex;
mod parse;
mod search;

use std::borrow::Cow;

pub use crate::compile::search::Searcher;
use crate::types::ast;
use crate::{Engine, Result};

/// Compile a template.
pub fn template<'engine, 'source>(
    engine: &'engine Engine<'engine>,
    source: Cow<'source, str>,
) -> Result<ast::Template<'source>> {
    let scope = parse::Parser::new(engine, &source).parse_template()?;
    debug!(
        len = source.len(),
        nodes = scope.nodes.len(),
        "compiled template"
    );
    Ok(ast::Template { source, scope })
}
