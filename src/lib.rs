//! A small template engine for event notification bodies.
//!
//! # Features
//!
//! ### Syntax
//!
//! - Expressions: `#{ ticket.summary }` or the short form `$ticket.summary`
//! - Conditionals: `{% if ticket.owner %} ... {% end %}`
//! - Multiway conditionals:
//!   `{% choose %}{% when cond %} ... {% otherwise %} ... {% end %}`
//! - Loops: `{% for field, change in changes %} ... {% end %}`
//! - Comments: `{# not rendered #}`
//! - Line joins: a `\` at the end of a line removes the line break
//! - A small set of string helpers: `#{ name.ljust(20) }`, `#{ ', '.join(cc) }`
//! - Configurable delimiters
//!
//! ### Engine
//!
//! - Lenient lookups: missing keys and out of range indexes render as nothing
//! - Render using any [`serde`] serializable values
//! - Convenient macro for building values:
//!   `herald::value!{ ticket: { id: 42 } }`
//!
//! # Getting started
//!
//! Your entry point is the [`Engine`] struct. The engine stores the syntax
//! config and compiled templates. Generally, you only need to construct one
//! engine during the lifetime of a program.
//!
//! ```
//! let engine = herald::Engine::new();
//! ```
//!
//! Next, [`.add_template`][Engine::add_template] is used to compile and store a
//! template in the engine.
//!
//! ```
//! # let mut engine = herald::Engine::new();
//! engine.add_template("subject", "#{ ticket.id }: $ticket.summary")?;
//! # Ok::<(), herald::Error>(())
//! ```
//!
//! Finally, the template is rendered by fetching it using
//! [`.get_template`][Engine::get_template] and calling
//! [`.render`][TemplateRef::render].
//!
//! ```
//! # let mut engine = herald::Engine::new();
//! # engine.add_template("subject", "#{ ticket.id }: $ticket.summary")?;
//! let template = engine.get_template("subject").unwrap();
//! let result = template.render(herald::value!{ ticket: { id: 7, summary: "Crash" }})?;
//! assert_eq!(result, "7: Crash");
//! # Ok::<(), herald::Error>(())
//! ```
//!
//! If you don't need to store the compiled template then you can also use the
//! [`.compile`][Engine::compile] function to return the template directly.
//!
//! ```
//! # let engine = herald::Engine::new();
//! let template = engine.compile("Hello #{ user.name }!")?;
//! let result = template.render(herald::value!{ user: { name: "John Smith" }})?;
//! assert_eq!(result, "Hello John Smith!");
//! # Ok::<(), herald::Error>(())
//! ```
//!
//! # Examples
//!
//! ### Render using structured data
//!
//! ```
//! #[derive(serde::Serialize)]
//! struct Context { ticket: Ticket }
//!
//! #[derive(serde::Serialize)]
//! struct Ticket { id: u32, status: String }
//!
//! let ctx = Context { ticket: Ticket { id: 7, status: "closed".into() } };
//!
//! let result = herald::Engine::new()
//!     .compile("{% if ticket.status == 'closed' %}#{ ticket.id } is done{% end %}")?
//!     .render(&ctx)?;
//!
//! assert_eq!(result, "7 is done");
//! # Ok::<(), herald::Error>(())
//! ```
//!
//! ### Render a template using custom syntax
//!
//! ```
//! let syntax = herald::Syntax::builder().expr("<?", "?>").block("<%", "%>").build();
//!
//! let result = herald::Engine::with_syntax(syntax)
//!     .compile("Hello <? user.name ?>")?
//!     .render(herald::value!{ user: { name: "John Smith" }})?;
//!
//! assert_eq!(result, "Hello John Smith");
//! # Ok::<(), herald::Error>(())
//! ```

#[macro_use]
mod trace;

mod compile;
mod error;
mod macros;
mod render;
mod types;
mod value;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

pub use crate::error::{Error, ErrorKind};
pub use crate::types::syntax::{Syntax, SyntaxBuilder};
#[cfg(feature = "serde")]
pub use crate::value::to_value;
pub use crate::value::{List, Map, Value};

use crate::compile::Searcher;
use crate::types::ast;

/// A type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The compilation and rendering engine.
pub struct Engine<'engine> {
    searcher: Searcher,
    templates: BTreeMap<Cow<'engine, str>, ast::Template<'engine>>,
}

/// A compiled template.
#[derive(Debug)]
pub struct Template<'source> {
    template: ast::Template<'source>,
}

/// A reference to a compiled template in an [`Engine`].
#[derive(Debug, Clone, Copy)]
pub struct TemplateRef<'engine> {
    template: &'engine ast::Template<'engine>,
}

impl<'engine> Default for Engine<'engine> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'engine> Engine<'engine> {
    /// Construct a new engine.
    #[inline]
    pub fn new() -> Self {
        Self::with_syntax(Syntax::default())
    }

    /// Construct a new engine with custom syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use herald::{Engine, Syntax};
    ///
    /// let syntax = Syntax::builder().expr("<{", "}>").block("<[", "]>").build();
    /// let engine = Engine::with_syntax(syntax);
    /// ```
    #[inline]
    pub fn with_syntax(syntax: Syntax<'_>) -> Self {
        Self {
            searcher: Searcher::new(syntax),
            templates: BTreeMap::new(),
        }
    }

    /// Add a template to the engine.
    ///
    /// The template will be compiled and stored under the given name,
    /// replacing any template previously stored under that name.
    #[inline]
    pub fn add_template<N, S>(&mut self, name: N, source: S) -> Result<()>
    where
        N: Into<Cow<'engine, str>>,
        S: Into<Cow<'engine, str>>,
    {
        let template = compile::template(self, source.into())?;
        self.templates.insert(name.into(), template);
        Ok(())
    }

    /// Lookup a template by name.
    #[inline]
    pub fn get_template(&self, name: &str) -> Option<TemplateRef<'_>> {
        self.templates
            .get(name)
            .map(|template| TemplateRef { template })
    }

    /// Remove a template by name.
    #[inline]
    pub fn remove_template(&mut self, name: &str) {
        self.templates.remove(name);
    }

    /// Compile a template.
    ///
    /// The template will not be stored in the engine. The advantage over
    /// [`.add_template(..)`][Engine::add_template] here is that the lifetime of
    /// the template source does not need to outlive the engine.
    #[inline]
    pub fn compile<'source>(&self, source: &'source str) -> Result<Template<'source>> {
        let template = compile::template(self, Cow::Borrowed(source))?;
        Ok(Template { template })
    }
}

impl fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("searcher", &self.searcher)
            .field("templates", &self.templates.keys())
            .finish()
    }
}

impl<'source> Template<'source> {
    /// Render the template to a string using the provided value.
    #[cfg(feature = "serde")]
    #[inline]
    pub fn render<S>(&self, ctx: S) -> Result<String>
    where
        S: serde::Serialize,
    {
        render::template(&self.template, &to_value(ctx)?)
    }

    /// Render the template to a string using the provided value.
    #[inline]
    pub fn render_from(&self, ctx: &Value) -> Result<String> {
        render::template(&self.template, ctx)
    }

    /// Returns the original template source.
    #[inline]
    pub fn source(&self) -> &str {
        &self.template.source
    }
}

impl<'engine> TemplateRef<'engine> {
    /// Render the template to a string using the provided value.
    #[cfg(feature = "serde")]
    #[inline]
    pub fn render<S>(&self, ctx: S) -> Result<String>
    where
        S: serde::Serialize,
    {
        render::template(self.template, &to_value(ctx)?)
    }

    /// Render the template to a string using the provided value.
    #[inline]
    pub fn render_from(&self, ctx: &Value) -> Result<String> {
        render::template(self.template, ctx)
    }

    /// Returns the original template source.
    #[inline]
    pub fn source(&self) -> &'engine str {
        &self.template.source
    }
}
