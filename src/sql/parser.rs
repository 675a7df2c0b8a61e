/// SQL Parser - converts tokens into AST
use super::ast::*;
use super::lexer::Lexer;
use super::token::{Token, TokenType};
use crate::error::{QuillError, Result};
use crate::types::{ColumnConstraint, ColumnDef, ColumnType, Value};

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(t) if t.token_type == TokenType::Eof) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token::new(TokenType::Eof, line, column));
        }
        Self { tokens, position: 0 }
    }

    /// Parse exactly one statement, an optional `;`, then end of input
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = match &self.current().token_type {
            TokenType::Create => Statement::CreateTable(self.parse_create_table()?),
            TokenType::Insert => Statement::Insert(self.parse_insert()?),
            TokenType::Select => Statement::Select(self.parse_select()?),
            TokenType::Update => Statement::Update(self.parse_update()?),
            TokenType::Delete => Statement::Delete(self.parse_delete()?),
            TokenType::Show => self.parse_show()?,
            TokenType::Describe => self.parse_describe()?,
            _ => {
                return Err(self.error("Expected CREATE, INSERT, SELECT, UPDATE, DELETE, SHOW or DESCRIBE"))
            }
        };

        self.match_token(TokenType::Semicolon);
        if !matches!(self.current().token_type, TokenType::Eof) {
            return Err(self.error("Unexpected input after end of statement"));
        }

        Ok(stmt)
    }

    /// CREATE TABLE ident '(' column_def (',' column_def)* ')'
    fn parse_create_table(&mut self) -> Result<CreateTableStmt> {
        self.expect(TokenType::Create)?;
        self.expect(TokenType::Table)?;
        let table = self.parse_identifier()?;

        self.expect(TokenType::LParen)?;
        let mut columns = vec![self.parse_column_def()?];
        while self.match_token(TokenType::Comma) {
            columns.push(self.parse_column_def()?);
        }
        self.expect(TokenType::RParen)?;

        Ok(CreateTableStmt { table, columns })
    }

    /// ident type constraint*
    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.parse_identifier()?;

        let col_type = match self.current().token_type {
            TokenType::Int => ColumnType::Int,
            TokenType::Text => ColumnType::Text,
            TokenType::Bool => ColumnType::Bool,
            _ => return Err(self.error("Expected column type INT, TEXT or BOOL")),
        };
        self.advance();

        let mut column = ColumnDef::new(name, col_type);
        loop {
            if self.match_token(TokenType::Primary) {
                self.expect(TokenType::Key)?;
                column.add_constraint(ColumnConstraint::PrimaryKey);
            } else if self.match_token(TokenType::Unique) {
                column.add_constraint(ColumnConstraint::Unique);
            } else {
                break;
            }
        }

        Ok(column)
    }

    /// INSERT INTO ident '(' ident_list ')' VALUES '(' value_list ')'
    fn parse_insert(&mut self) -> Result<InsertStmt> {
        self.expect(TokenType::Insert)?;
        self.expect(TokenType::Into)?;
        let table = self.parse_identifier()?;

        self.expect(TokenType::LParen)?;
        let mut columns = vec![self.parse_identifier()?];
        while self.match_token(TokenType::Comma) {
            columns.push(self.parse_identifier()?);
        }
        self.expect(TokenType::RParen)?;

        self.expect(TokenType::Values)?;
        self.expect(TokenType::LParen)?;
        let mut values = vec![self.parse_value()?];
        while self.match_token(TokenType::Comma) {
            values.push(self.parse_value()?);
        }
        self.expect(TokenType::RParen)?;

        Ok(InsertStmt { table, columns, values })
    }

    /// SELECT (col_list | '*') FROM ident join? where?
    fn parse_select(&mut self) -> Result<SelectStmt> {
        self.expect(TokenType::Select)?;

        let columns = if self.match_token(TokenType::Star) {
            SelectColumns::Star
        } else {
            let mut refs = vec![self.parse_column_ref()?];
            while self.match_token(TokenType::Comma) {
                refs.push(self.parse_column_ref()?);
            }
            SelectColumns::Columns(refs)
        };

        self.expect(TokenType::From)?;
        let from = self.parse_identifier()?;

        let join = if self.match_token(TokenType::Inner) {
            self.expect(TokenType::Join)?;
            let table = self.parse_identifier()?;
            self.expect(TokenType::On)?;
            let left = self.parse_column_ref()?;
            self.expect(TokenType::Eq)?;
            let right = self.parse_column_ref()?;
            Some(JoinClause { table, left, right })
        } else {
            None
        };

        let where_clause = self.parse_where()?;

        Ok(SelectStmt {
            columns,
            from,
            join,
            where_clause,
        })
    }

    /// UPDATE ident SET assignment (',' assignment)* where?
    fn parse_update(&mut self) -> Result<UpdateStmt> {
        self.expect(TokenType::Update)?;
        let table = self.parse_identifier()?;
        self.expect(TokenType::Set)?;

        let mut assignments = vec![self.parse_assignment()?];
        while self.match_token(TokenType::Comma) {
            assignments.push(self.parse_assignment()?);
        }

        let where_clause = self.parse_where()?;

        Ok(UpdateStmt {
            table,
            assignments,
            where_clause,
        })
    }

    fn parse_assignment(&mut self) -> Result<(String, Value)> {
        let column = self.parse_identifier()?;
        self.expect(TokenType::Eq)?;
        let value = self.parse_value()?;
        Ok((column, value))
    }

    /// DELETE FROM ident where?
    fn parse_delete(&mut self) -> Result<DeleteStmt> {
        self.expect(TokenType::Delete)?;
        self.expect(TokenType::From)?;
        let table = self.parse_identifier()?;
        let where_clause = self.parse_where()?;

        Ok(DeleteStmt { table, where_clause })
    }

    /// SHOW TABLES
    fn parse_show(&mut self) -> Result<Statement> {
        self.expect(TokenType::Show)?;
        self.expect(TokenType::Tables)?;
        Ok(Statement::ShowTables)
    }

    /// DESCRIBE ident
    fn parse_describe(&mut self) -> Result<Statement> {
        self.expect(TokenType::Describe)?;
        let table = self.parse_identifier()?;
        Ok(Statement::DescribeTable(table))
    }

    /// WHERE col_ref '=' value
    fn parse_where(&mut self) -> Result<Option<WhereCondition>> {
        if !self.match_token(TokenType::Where) {
            return Ok(None);
        }

        let column = self.parse_column_ref()?;
        self.expect(TokenType::Eq)?;
        let value = self.parse_value()?;

        Ok(Some(WhereCondition { column, value }))
    }

    /// ident ('.' ident)?
    fn parse_column_ref(&mut self) -> Result<ColumnRef> {
        let first = self.parse_identifier()?;
        if self.match_token(TokenType::Dot) {
            let column = self.parse_identifier()?;
            Ok(ColumnRef::qualified(first, column))
        } else {
            Ok(ColumnRef::new(first))
        }
    }

    /// Identifier, or a reserved word used as a name (lower-cased)
    fn parse_identifier(&mut self) -> Result<String> {
        let name = match &self.current().token_type {
            TokenType::Identifier(name) => name.clone(),
            other => match other.keyword_text() {
                Some(keyword) => keyword.to_string(),
                None => return Err(self.error("Expected identifier")),
            },
        };
        self.advance();
        Ok(name)
    }

    /// Literal: number, string, TRUE/FALSE or NULL
    fn parse_value(&mut self) -> Result<Value> {
        let value = match &self.current().token_type {
            TokenType::Number(n) => Value::Integer(*n),
            TokenType::String(s) => Value::Text(s.clone()),
            TokenType::Boolean(b) => Value::Bool(*b),
            TokenType::Null => Value::Null,
            _ => return Err(self.error("Expected a literal value")),
        };
        self.advance();
        Ok(value)
    }

    // Helper methods

    fn current(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn match_token(&mut self, token_type: TokenType) -> bool {
        if std::mem::discriminant(&self.current().token_type) == std::mem::discriminant(&token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token_type: TokenType) -> Result<()> {
        if self.match_token(token_type.clone()) {
            Ok(())
        } else {
            Err(self.error(&format!("Expected {}", token_type.describe())))
        }
    }

    fn error(&self, msg: &str) -> QuillError {
        let token = self.current();
        QuillError::syntax(
            format!("{}, found {}", msg, token.token_type.describe()),
            token.line,
            token.column,
        )
    }
}

/// Tokenize and parse one statement
pub fn parse_sql(sql: &str) -> Result<Statement> {
    let tokens = Lexer::new(sql).tokenize()?;
    Parser::new(tokens).parse()
}
