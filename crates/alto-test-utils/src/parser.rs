//! Recursive-descent parser for the subset of AL used by test fixtures.
//!
//! Production trees come from the AL language service; fixtures only need
//! enough of the grammar to exercise the refactorings: objects, properties,
//! variable sections, procedures/triggers, statements and expressions. Blocks
//! the refactorings never look at (fields, keys, layouts, actions) are
//! skipped wholesale.

use alto_core::{TextRange, TextSize};
use alto_syntax::{SyntaxKind, SyntaxTree, SyntaxTreeBuilder, TreeError};
use thiserror::Error;

use crate::lexer::{lex, Token, TokenKind};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("expected {expected} at offset {offset}, found `{found}`")]
    Unexpected {
        expected: &'static str,
        found: String,
        offset: u32,
    },
    #[error(transparent)]
    Tree(#[from] TreeError),
}

type Result<T> = std::result::Result<T, ParseError>;

/// Parses `text` into a tree tagged with `version`.
pub fn parse(text: &str, version: i32) -> Result<SyntaxTree> {
    let mut parser = Parser {
        text,
        tokens: lex(text),
        pos: 0,
        last_end: TextSize::from(0),
        builder: SyntaxTreeBuilder::new(text, version),
    };
    parser.compilation_unit()?;
    Ok(parser.builder.finish()?)
}

const MODIFIERS: [&str; 4] = ["local", "internal", "protected", "public"];

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    last_end: TextSize,
    builder: SyntaxTreeBuilder,
}

impl<'a> Parser<'a> {
    // --- token helpers ---

    fn nth(&self, n: usize) -> Token {
        let last = self.tokens.len() - 1;
        self.tokens[(self.pos + n).min(last)]
    }

    fn peek(&self) -> Token {
        self.nth(0)
    }

    fn token_text(&self, token: Token) -> &'a str {
        let range = token.range;
        &self.text[u32::from(range.start()) as usize..u32::from(range.end()) as usize]
    }

    fn nth_text(&self, n: usize) -> &'a str {
        self.token_text(self.nth(n))
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn at(&self, punct: &str) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Punct && self.token_text(token) == punct
    }

    fn nth_is_kw(&self, n: usize, kw: &str) -> bool {
        let token = self.nth(n);
        token.kind == TokenKind::Ident && self.token_text(token).eq_ignore_ascii_case(kw)
    }

    fn at_kw(&self, kw: &str) -> bool {
        self.nth_is_kw(0, kw)
    }

    fn at_name(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Ident | TokenKind::QuotedIdent)
    }

    fn bump(&mut self) -> Token {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
            self.last_end = token.range.end();
        }
        token
    }

    fn unexpected<T>(&self, expected: &'static str) -> Result<T> {
        let token = self.peek();
        Err(ParseError::Unexpected {
            expected,
            found: self.token_text(token).to_string(),
            offset: u32::from(token.range.start()),
        })
    }

    fn expect(&mut self, punct: &'static str) -> Result<Token> {
        if self.at(punct) {
            Ok(self.bump())
        } else {
            self.unexpected(punct)
        }
    }

    fn expect_kw(&mut self, kw: &'static str) -> Result<Token> {
        if self.at_kw(kw) {
            Ok(self.bump())
        } else {
            self.unexpected(kw)
        }
    }

    fn expect_name(&mut self) -> Result<Token> {
        if self.at_name() {
            Ok(self.bump())
        } else {
            self.unexpected("identifier")
        }
    }

    // --- builder helpers ---

    fn start(&mut self, kind: SyntaxKind) {
        let token = self.peek();
        self.builder
            .start_node(kind, token.full_start, token.range.start());
    }

    fn finish(&mut self) {
        self.builder.finish_node(self.last_end);
    }

    fn leaf(&mut self, kind: SyntaxKind) -> Token {
        let token = self.bump();
        let name = self.token_text(token);
        self.builder
            .leaf(kind, token.full_start, token.range, Some(name));
        token
    }

    fn slice(&self, start: TextSize) -> &'a str {
        let range = TextRange::new(start, self.last_end.max(start));
        &self.text[u32::from(range.start()) as usize..u32::from(range.end()) as usize]
    }

    fn skip_balanced(&mut self, open: &'static str, close: &'static str) -> Result<()> {
        self.expect(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            if self.at_eof() {
                return self.unexpected(close);
            }
            if self.at(open) {
                depth += 1;
            } else if self.at(close) {
                depth -= 1;
            }
            self.bump();
        }
        Ok(())
    }

    // --- objects ---

    fn compilation_unit(&mut self) -> Result<()> {
        let zero = TextSize::from(0);
        self.builder
            .start_node(SyntaxKind::CompilationUnit, zero, zero);
        while !self.at_eof() {
            self.object()?;
        }
        self.builder
            .finish_node(TextSize::from(self.text.len() as u32));
        Ok(())
    }

    fn object(&mut self) -> Result<()> {
        let Some(kind) = SyntaxKind::from_object_keyword(self.nth_text(0)) else {
            return self.unexpected("object keyword");
        };
        self.start(kind);
        self.bump();
        if self.peek().kind == TokenKind::Int {
            self.leaf(SyntaxKind::ObjectId);
        }
        let name = self.expect_name()?;
        let name = self.token_text(name);
        self.builder.set_name(name);
        // `extends X`, `implements Y` and similar clauses.
        while !self.at("{") && !self.at_eof() {
            self.bump();
        }
        self.expect("{")?;
        while !self.at("}") {
            if self.at_eof() {
                return self.unexpected("}");
            }
            self.member()?;
        }
        self.bump();
        self.finish();
        Ok(())
    }

    fn member(&mut self) -> Result<()> {
        if self.at_kw("var") || (self.at_kw("protected") && self.nth_is_kw(1, "var")) {
            return self.global_var_section();
        }
        if self.at("[") || self.at_method_start() {
            return self.method();
        }
        if self.at_name() && self.nth_text(1) == "=" {
            return self.property_list();
        }
        // Anything else (fields, keys, layout, actions, values) is skipped.
        while !self.at("{") && !self.at(";") {
            if self.at_eof() || self.at("}") {
                return self.unexpected("member");
            }
            self.bump();
        }
        if self.at(";") {
            self.bump();
            return Ok(());
        }
        self.skip_balanced("{", "}")
    }

    fn at_method_start(&self) -> bool {
        self.at_kw("procedure")
            || self.at_kw("trigger")
            || (MODIFIERS.iter().any(|m| self.at_kw(m)) && self.nth_is_kw(1, "procedure"))
    }

    fn property_list(&mut self) -> Result<()> {
        self.start(SyntaxKind::PropertyList);
        while self.at_name() && self.nth_text(1) == "=" {
            self.start(SyntaxKind::Property);
            let name = self.bump();
            let name = self.token_text(name);
            self.builder.set_name(name);
            self.bump();
            let value_start = self.peek().range.start();
            while !self.at(";") {
                if self.at_eof() {
                    return self.unexpected(";");
                }
                self.bump();
            }
            let value = self.slice(value_start).trim();
            self.builder.set_data_type(value);
            self.bump();
            self.finish();
        }
        self.finish();
        Ok(())
    }

    fn global_var_section(&mut self) -> Result<()> {
        self.start(SyntaxKind::GlobalVarSection);
        if self.at_kw("protected") {
            self.bump();
        }
        self.bump();
        while self.at_variable_declaration() {
            self.variable_declaration()?;
        }
        self.finish();
        Ok(())
    }

    fn at_variable_declaration(&self) -> bool {
        self.at_name() && matches!(self.nth_text(1), ":" | ",")
    }

    fn var_section(&mut self) -> Result<()> {
        self.start(SyntaxKind::VarSection);
        self.bump();
        while self.at_variable_declaration() {
            self.variable_declaration()?;
        }
        self.finish();
        Ok(())
    }

    fn variable_declaration(&mut self) -> Result<()> {
        let is_list = self.nth_text(1) == ",";
        self.start(if is_list {
            SyntaxKind::VariableListDeclaration
        } else {
            SyntaxKind::VariableDeclaration
        });
        let first = self.leaf(SyntaxKind::VariableDeclarationName);
        let first = self.token_text(first);
        while self.at(",") {
            self.bump();
            if !self.at_name() {
                return self.unexpected("identifier");
            }
            self.leaf(SyntaxKind::VariableDeclarationName);
        }
        self.expect(":")?;
        let data_type = self.type_reference()?;
        if !is_list {
            self.builder.set_name(first);
        }
        self.builder.set_data_type(data_type);
        self.expect(";")?;
        self.finish();
        Ok(())
    }

    /// Parses a type up to the next `;`, `)` or section keyword and returns its text.
    fn type_reference(&mut self) -> Result<&'a str> {
        let first = self.nth_text(0);
        let kind = match first.to_ascii_lowercase().as_str() {
            "record" => SyntaxKind::RecordTypeReference,
            "label" => SyntaxKind::LabelDataType,
            "array" => SyntaxKind::ArrayDataType,
            "dotnet" => SyntaxKind::DotNetTypeReference,
            "text" | "code" if self.nth_text(1) == "[" => SyntaxKind::LengthDataType,
            "codeunit" | "page" | "report" | "query" | "xmlport" | "enum" | "interface"
            | "testpage" | "testrequestpage" => SyntaxKind::SubtypedDataType,
            _ => SyntaxKind::SimpleTypeReference,
        };
        if !self.at_name() {
            return self.unexpected("type");
        }
        self.start(kind);
        let start = self.peek().range.start();
        let mut depth = 0usize;
        loop {
            if self.at_eof() {
                return self.unexpected("end of type");
            }
            if depth == 0
                && (self.at(";") || self.at(")") || self.at_kw("var") || self.at_kw("begin"))
                && self.peek().range.start() > start
            {
                break;
            }
            if self.at("(") || self.at("[") {
                depth += 1;
            } else if self.at(")") || self.at("]") {
                depth = depth.saturating_sub(1);
            }
            self.bump();
        }
        let text = self.slice(start);
        self.builder.set_data_type(text);
        self.finish();
        Ok(text)
    }

    // --- methods ---

    fn method(&mut self) -> Result<()> {
        let mut n = 0;
        while !self.nth_is_kw(n, "procedure")
            && !self.nth_is_kw(n, "trigger")
            && self.nth(n).kind != TokenKind::Eof
        {
            n += 1;
        }
        let kind = if self.nth_is_kw(n, "trigger") {
            SyntaxKind::TriggerDeclaration
        } else {
            SyntaxKind::MethodDeclaration
        };
        self.start(kind);

        while self.at("[") {
            self.attribute()?;
        }
        if MODIFIERS.iter().any(|m| self.at_kw(m)) {
            self.leaf(SyntaxKind::AccessModifier);
        }
        if !(self.at_kw("procedure") || self.at_kw("trigger")) {
            return self.unexpected("procedure");
        }
        self.bump();
        let name = self.expect_name()?;
        let name_text = self.token_text(name);
        self.builder
            .leaf(SyntaxKind::IdentifierName, name.full_start, name.range, Some(name_text));
        self.builder.set_name(name_text);

        self.parameter_list()?;
        if self.at(":") || (self.at_name() && self.nth_text(1) == ":") {
            self.return_value()?;
        }
        if self.at(";") {
            // Declaration without body (interfaces).
            self.bump();
            self.finish();
            return Ok(());
        }
        if self.at_kw("var") {
            self.var_section()?;
        }
        self.block()?;
        if self.at(";") {
            self.bump();
        }
        self.finish();
        Ok(())
    }

    fn attribute(&mut self) -> Result<()> {
        self.start(SyntaxKind::MemberAttribute);
        self.bump();
        let inner_start = self.peek().range.start();
        let mut depth = 1usize;
        loop {
            if self.at_eof() {
                return self.unexpected("]");
            }
            if self.at("[") {
                depth += 1;
            } else if self.at("]") {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            self.bump();
        }
        let inner = self.slice(inner_start).trim();
        self.bump();
        self.builder.set_name(inner);
        self.finish();
        Ok(())
    }

    fn parameter_list(&mut self) -> Result<()> {
        self.start(SyntaxKind::ParameterList);
        self.expect("(")?;
        while !self.at(")") {
            self.parameter()?;
            if self.at(";") {
                self.bump();
            } else if !self.at(")") {
                return self.unexpected(")");
            }
        }
        self.bump();
        self.finish();
        Ok(())
    }

    fn parameter(&mut self) -> Result<()> {
        self.start(SyntaxKind::Parameter);
        if self.at_kw("var") && matches!(self.nth(1).kind, TokenKind::Ident | TokenKind::QuotedIdent)
        {
            self.bump();
        }
        let name = self.leaf(SyntaxKind::VariableDeclarationName);
        let name = self.token_text(name);
        self.expect(":")?;
        let data_type = self.type_reference()?;
        self.builder.set_name(name);
        self.builder.set_data_type(data_type);
        self.finish();
        Ok(())
    }

    fn return_value(&mut self) -> Result<()> {
        self.start(SyntaxKind::ReturnValue);
        let name = if self.at_name() {
            let token = self.leaf(SyntaxKind::VariableDeclarationName);
            Some(self.token_text(token))
        } else {
            None
        };
        self.expect(":")?;
        let data_type = self.type_reference()?;
        if let Some(name) = name {
            self.builder.set_name(name);
        }
        self.builder.set_data_type(data_type);
        self.finish();
        Ok(())
    }

    // --- statements ---

    fn block(&mut self) -> Result<()> {
        self.start(SyntaxKind::Block);
        self.expect_kw("begin")?;
        self.statement_list(&["end"])?;
        self.expect_kw("end")?;
        self.finish();
        Ok(())
    }

    /// Statements up to (not including) one of `terminators`. A `;` following
    /// a statement becomes part of it.
    fn statement_list(&mut self, terminators: &[&str]) -> Result<()> {
        let mut after_statement = false;
        loop {
            if self.at(";") {
                self.bump();
                if after_statement {
                    self.builder.extend_last_child(self.last_end);
                }
                after_statement = false;
                continue;
            }
            if terminators.iter().any(|t| self.at_kw(t)) {
                return Ok(());
            }
            if self.at_eof() {
                return self.unexpected("end");
            }
            self.statement()?;
            after_statement = true;
        }
    }

    fn statement(&mut self) -> Result<()> {
        if self.at_kw("begin") {
            return self.block();
        }
        if self.at_kw("if") {
            self.start(SyntaxKind::IfStatement);
            self.bump();
            self.expression()?;
            self.expect_kw("then")?;
            self.optional_statement()?;
            if self.at_kw("else") {
                self.bump();
                self.optional_statement()?;
            }
            self.finish();
            return Ok(());
        }
        if self.at_kw("case") {
            return self.case_statement();
        }
        if self.at_kw("while") || self.at_kw("with") {
            let kind = if self.at_kw("while") {
                SyntaxKind::WhileStatement
            } else {
                SyntaxKind::WithStatement
            };
            self.start(kind);
            self.bump();
            self.expression()?;
            self.expect_kw("do")?;
            self.optional_statement()?;
            self.finish();
            return Ok(());
        }
        if self.at_kw("repeat") {
            self.start(SyntaxKind::RepeatStatement);
            self.bump();
            self.statement_list(&["until"])?;
            self.bump();
            self.expression()?;
            self.finish();
            return Ok(());
        }
        if self.at_kw("for") {
            self.start(SyntaxKind::ForStatement);
            self.bump();
            self.leaf(SyntaxKind::IdentifierName);
            self.expect(":=")?;
            self.expression()?;
            if !(self.at_kw("to") || self.at_kw("downto")) {
                return self.unexpected("to");
            }
            self.bump();
            self.expression()?;
            self.expect_kw("do")?;
            self.optional_statement()?;
            self.finish();
            return Ok(());
        }
        if self.at_kw("foreach") {
            self.start(SyntaxKind::ForEachStatement);
            self.bump();
            self.leaf(SyntaxKind::IdentifierName);
            self.expect_kw("in")?;
            self.expression()?;
            self.expect_kw("do")?;
            self.optional_statement()?;
            self.finish();
            return Ok(());
        }
        if self.at_kw("exit") {
            self.start(SyntaxKind::ExitStatement);
            self.bump();
            if self.at("(") {
                self.bump();
                if !self.at(")") {
                    self.expression()?;
                }
                self.expect(")")?;
            }
            self.finish();
            return Ok(());
        }
        if self.at_kw("break") {
            let token = self.peek();
            self.bump();
            self.builder
                .leaf(SyntaxKind::BreakStatement, token.full_start, token.range, None);
            return Ok(());
        }
        self.simple_statement()
    }

    /// The statement after `then`, `else` or `do`, which may be empty.
    fn optional_statement(&mut self) -> Result<()> {
        if self.at(";") || self.at_kw("else") || self.at_kw("end") {
            return Ok(());
        }
        self.statement()
    }

    fn case_statement(&mut self) -> Result<()> {
        self.start(SyntaxKind::CaseStatement);
        self.bump();
        self.expression()?;
        self.expect_kw("of")?;
        while !self.at_kw("end") && !self.at_kw("else") {
            if self.at_eof() {
                return self.unexpected("end");
            }
            self.start(SyntaxKind::CaseLine);
            self.list_item()?;
            while self.at(",") {
                self.bump();
                self.list_item()?;
            }
            self.expect(":")?;
            self.optional_statement()?;
            if self.at(";") {
                self.bump();
            }
            self.finish();
        }
        if self.at_kw("else") {
            self.start(SyntaxKind::CaseElse);
            self.bump();
            self.statement_list(&["end"])?;
            self.finish();
        }
        self.expect_kw("end")?;
        self.finish();
        Ok(())
    }

    fn simple_statement(&mut self) -> Result<()> {
        let cp = self.builder.checkpoint();
        let kind = self.expression()?;
        let assignment = match self.nth_text(0) {
            ":=" => Some(SyntaxKind::AssignmentStatement),
            "+=" | "-=" | "*=" | "/=" => Some(SyntaxKind::CompoundAssignmentStatement),
            _ => None,
        };
        if let Some(assignment) = assignment {
            self.builder.start_node_at(cp, assignment);
            self.bump();
            self.expression()?;
            self.finish();
        } else if matches!(
            kind,
            SyntaxKind::IdentifierName | SyntaxKind::MemberAccessExpression
        ) {
            // `Foo;` is a call without parentheses.
            self.builder
                .start_node_at(cp, SyntaxKind::InvocationExpression);
            self.finish();
        }
        Ok(())
    }

    // --- expressions ---

    fn expression(&mut self) -> Result<SyntaxKind> {
        let cp = self.builder.checkpoint();
        let mut kind = self.additive()?;
        loop {
            let op = match self.nth_text(0) {
                _ if self.at_kw("in") => SyntaxKind::InExpression,
                "=" => SyntaxKind::EqualsExpression,
                "<>" => SyntaxKind::NotEqualsExpression,
                "<" => SyntaxKind::LessThanExpression,
                "<=" => SyntaxKind::LessThanOrEqualExpression,
                ">" => SyntaxKind::GreaterThanExpression,
                ">=" => SyntaxKind::GreaterThanOrEqualExpression,
                _ => return Ok(kind),
            };
            self.builder.start_node_at(cp, op);
            self.bump();
            if op == SyntaxKind::InExpression {
                self.in_list()?;
            } else {
                self.additive()?;
            }
            self.finish();
            kind = op;
        }
    }

    fn additive(&mut self) -> Result<SyntaxKind> {
        let cp = self.builder.checkpoint();
        let mut kind = self.multiplicative()?;
        loop {
            let op = if self.at("+") {
                SyntaxKind::AddExpression
            } else if self.at("-") {
                SyntaxKind::SubtractExpression
            } else if self.at_kw("or") {
                SyntaxKind::LogicalOrExpression
            } else if self.at_kw("xor") {
                SyntaxKind::LogicalXorExpression
            } else {
                return Ok(kind);
            };
            self.builder.start_node_at(cp, op);
            self.bump();
            self.multiplicative()?;
            self.finish();
            kind = op;
        }
    }

    fn multiplicative(&mut self) -> Result<SyntaxKind> {
        let cp = self.builder.checkpoint();
        let mut kind = self.unary()?;
        loop {
            let op = if self.at("*") {
                SyntaxKind::MultiplyExpression
            } else if self.at("/") {
                SyntaxKind::DivideExpression
            } else if self.at_kw("div") {
                SyntaxKind::IntegerDivideExpression
            } else if self.at_kw("mod") {
                SyntaxKind::ModuloExpression
            } else if self.at_kw("and") {
                SyntaxKind::LogicalAndExpression
            } else {
                return Ok(kind);
            };
            self.builder.start_node_at(cp, op);
            self.bump();
            self.unary()?;
            self.finish();
            kind = op;
        }
    }

    fn unary(&mut self) -> Result<SyntaxKind> {
        let kind = if self.at_kw("not") {
            SyntaxKind::UnaryNotExpression
        } else if self.at("-") {
            SyntaxKind::UnaryMinusExpression
        } else if self.at("+") {
            SyntaxKind::UnaryPlusExpression
        } else {
            return self.postfix();
        };
        self.start(kind);
        self.bump();
        self.unary()?;
        self.finish();
        Ok(kind)
    }

    fn postfix(&mut self) -> Result<SyntaxKind> {
        let cp = self.builder.checkpoint();
        let mut kind = self.primary()?;
        loop {
            if self.at(".") {
                self.builder
                    .start_node_at(cp, SyntaxKind::MemberAccessExpression);
                self.bump();
                if !self.at_name() {
                    return self.unexpected("member name");
                }
                self.leaf(SyntaxKind::IdentifierName);
                self.finish();
                kind = SyntaxKind::MemberAccessExpression;
            } else if self.at("::") {
                self.builder
                    .start_node_at(cp, SyntaxKind::OptionAccessExpression);
                self.bump();
                if !self.at_name() {
                    return self.unexpected("option name");
                }
                self.leaf(SyntaxKind::IdentifierName);
                self.finish();
                kind = SyntaxKind::OptionAccessExpression;
            } else if self.at("(") {
                self.builder
                    .start_node_at(cp, SyntaxKind::InvocationExpression);
                self.arguments(SyntaxKind::ArgumentList, "(", ")")?;
                self.finish();
                kind = SyntaxKind::InvocationExpression;
            } else if self.at("[") {
                self.builder
                    .start_node_at(cp, SyntaxKind::ElementAccessExpression);
                self.arguments(SyntaxKind::BracketedArgumentList, "[", "]")?;
                self.finish();
                kind = SyntaxKind::ElementAccessExpression;
            } else {
                return Ok(kind);
            }
        }
    }

    fn arguments(&mut self, kind: SyntaxKind, open: &'static str, close: &'static str) -> Result<()> {
        self.start(kind);
        self.expect(open)?;
        while !self.at(close) {
            self.expression()?;
            if self.at(",") {
                self.bump();
            } else if !self.at(close) {
                return self.unexpected(close);
            }
        }
        self.bump();
        self.finish();
        Ok(())
    }

    fn in_list(&mut self) -> Result<()> {
        self.start(SyntaxKind::InList);
        self.expect("[")?;
        while !self.at("]") {
            self.list_item()?;
            if self.at(",") {
                self.bump();
            } else if !self.at("]") {
                return self.unexpected("]");
            }
        }
        self.bump();
        self.finish();
        Ok(())
    }

    /// An element of an `in` list or case line: a value or a `from..to` range.
    fn list_item(&mut self) -> Result<()> {
        let cp = self.builder.checkpoint();
        self.expression()?;
        if self.at("..") {
            self.builder.start_node_at(cp, SyntaxKind::RangeExpression);
            self.bump();
            self.expression()?;
            self.finish();
        }
        Ok(())
    }

    fn primary(&mut self) -> Result<SyntaxKind> {
        let token = self.peek();
        let literal = match token.kind {
            TokenKind::Int => Some(SyntaxKind::Int32SignedLiteralValue),
            TokenKind::Decimal => Some(SyntaxKind::DecimalSignedLiteralValue),
            TokenKind::String => Some(SyntaxKind::StringLiteralValue),
            TokenKind::Ident if self.at_kw("true") || self.at_kw("false") => {
                Some(SyntaxKind::BooleanLiteralValue)
            }
            _ => None,
        };
        if let Some(value) = literal {
            self.start(SyntaxKind::LiteralExpression);
            self.bump();
            self.builder.leaf(value, token.range.start(), token.range, None);
            self.finish();
            return Ok(SyntaxKind::LiteralExpression);
        }
        if self.at_name() {
            self.leaf(SyntaxKind::IdentifierName);
            return Ok(SyntaxKind::IdentifierName);
        }
        if self.at("(") {
            self.start(SyntaxKind::ParenthesizedExpression);
            self.bump();
            self.expression()?;
            self.expect(")")?;
            self.finish();
            return Ok(SyntaxKind::ParenthesizedExpression);
        }
        if self.at("[") {
            self.in_list()?;
            return Ok(SyntaxKind::InList);
        }
        self.unexpected("expression")
    }
}
