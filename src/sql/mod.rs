/// QuillDB SQL Engine
///
/// Architecture:
/// - Lexer: Tokenizes SQL strings
/// - Parser: Builds AST from tokens
/// - Join: Two-table INNER JOIN (index nested loop)
/// - Executor: Executes statements against the storage engine

pub mod ast;
pub mod executor;
pub mod join;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{ColumnRef, JoinClause, SelectColumns, Statement, WhereCondition};
pub use executor::{AccessPath, ExecutionResult, QueryExecutor, QueryResult};
pub use lexer::Lexer;
pub use parser::{parse_sql, Parser};
pub use token::{Token, TokenType};

use crate::database::Database;

/// Parse and execute a SQL statement
pub fn execute_sql(db: &mut Database, sql: &str) -> ExecutionResult {
    let statement = parse_sql(sql)?;
    QueryExecutor::new(db).execute(statement)
}
