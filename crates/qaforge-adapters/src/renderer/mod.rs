//! Template renderer adapters.

mod handlebars;

pub use self::handlebars::HandlebarsRenderer;
