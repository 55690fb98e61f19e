use floe_common::Result;
use sqlparser::ast::Expr;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;

/// Compiles the configured filter string into an expression the format
/// library can push down. A malformed filter fails at configure time.
pub fn compile_filter(filter: &str) -> Result<Expr> {
    let dialect = GenericDialect {};
    let mut parser = Parser::new(&dialect).try_with_sql(filter)?;
    let expr = parser.parse_expr()?;
    // Trailing tokens after a valid expression are a syntax error too.
    parser.expect_token(&Token::EOF)?;
    Ok(expr)
}
