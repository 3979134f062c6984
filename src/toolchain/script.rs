//! Script minification with oxc.

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::{ScriptMinifier, ToolError, ToolResult};

/// Minifies classic browser scripts; top-level names are kept so pages
/// can still call into them.
pub struct OxcMinifier;

impl ScriptMinifier for OxcMinifier {
    fn minify(&self, source: &str) -> ToolResult<String> {
        let allocator = Allocator::default();
        // Script mode keeps unreferenced top-level declarations: other
        // scripts and inline handlers reach them as globals.
        let ret = Parser::new(&allocator, source, SourceType::script()).parse();
        if !ret.errors.is_empty() {
            let messages: Vec<_> = ret.errors.iter().map(ToString::to_string).collect();
            return Err(ToolError(messages.join("\n")));
        }

        let mut program = ret.program;
        let options = MinifierOptions {
            mangle: Some(MangleOptions {
                top_level: Some(false),
                ..MangleOptions::default()
            }),
            compress: Some(CompressOptions::smallest()),
        };
        let ret = Minifier::new(options).minify(&allocator, &mut program);

        Ok(Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                ..CodegenOptions::default()
            })
            .with_scoping(ret.scoping)
            .build(&program)
            .code)
    }
}
