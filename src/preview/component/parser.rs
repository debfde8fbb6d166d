//! Recursive-descent parser for the restricted component dialect.
//!
//! The dialect is deliberately small: a program layer of `const` component
//! definitions plus `render(...)` calls (produced only by the wrapper), and
//! an element language of intrinsic tags, capability tags, fragments, string
//! or `{expr}` attributes, text, and expression children. Expressions cover
//! literals, bare identifiers, and `ident(args)` calls. Anything outside the
//! dialect is a parse error carrying the line and column where scanning
//! stopped.

use crate::preview::outcome::RenderError;

// ============================================================================
// Syntax tree
// ============================================================================

#[derive(Debug, Clone)]
pub(crate) struct Program {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub(crate) enum Stmt {
    /// `const Name = () => { return ( ... ); };`
    ComponentDef { name: String, body: JsxNode },
    /// `render(...);`
    Render { node: JsxNode },
}

#[derive(Debug, Clone)]
pub(crate) enum JsxNode {
    Element {
        tag: String,
        attrs: Vec<Attr>,
        children: Vec<JsxNode>,
    },
    Fragment {
        children: Vec<JsxNode>,
    },
    Text(String),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub(crate) struct Attr {
    pub name: String,
    pub value: AttrValue,
}

#[derive(Debug, Clone)]
pub(crate) enum AttrValue {
    /// `name="text"` or `name='text'`
    Literal(String),
    /// `name={expr}`
    Expr(Expr),
    /// Bare `name`, equivalent to `name={true}`.
    Flag,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
    Ident(String),
    Call { callee: String, args: Vec<Expr> },
}

pub(crate) fn parse_program(source: &str) -> Result<Program, RenderError> {
    Parser::new(source).program()
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    idx: usize,
    line: usize,
    col: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            idx: 0,
            line: 1,
            col: 1,
        }
    }

    fn program(&mut self) -> Result<Program, RenderError> {
        let mut stmts = Vec::new();
        self.skip_ws();
        while self.peek().is_some() {
            stmts.push(self.statement()?);
            self.skip_ws();
        }
        Ok(Program { stmts })
    }

    fn statement(&mut self) -> Result<Stmt, RenderError> {
        if self.lookahead_is("const") {
            self.component_def()
        } else if self.lookahead_is("render") {
            self.render_call()
        } else {
            Err(self.error("Expected a component definition or a render call"))
        }
    }

    fn component_def(&mut self) -> Result<Stmt, RenderError> {
        self.expect("const")?;
        self.skip_ws();
        let name = self.ident()?;
        self.skip_ws();
        self.expect("=")?;
        self.skip_ws();
        self.expect("(")?;
        self.skip_ws();
        self.expect(")")?;
        self.skip_ws();
        self.expect("=>")?;
        self.skip_ws();
        self.expect("{")?;
        self.skip_ws();
        self.expect("return")?;
        self.skip_ws();
        self.expect("(")?;
        self.skip_ws();
        let body = self.jsx_node()?;
        self.skip_ws();
        self.expect(")")?;
        self.skip_ws();
        self.eat(";");
        self.skip_ws();
        self.expect("}")?;
        self.skip_ws();
        self.eat(";");
        Ok(Stmt::ComponentDef { name, body })
    }

    fn render_call(&mut self) -> Result<Stmt, RenderError> {
        self.expect("render")?;
        self.skip_ws();
        self.expect("(")?;
        self.skip_ws();
        let node = self.jsx_node()?;
        self.skip_ws();
        self.expect(")")?;
        self.skip_ws();
        self.eat(";");
        Ok(Stmt::Render { node })
    }

    // ========================================================================
    // Elements
    // ========================================================================

    fn jsx_node(&mut self) -> Result<JsxNode, RenderError> {
        if self.starts_with("<>") {
            self.fragment()
        } else if self.starts_with("<") {
            self.element()
        } else {
            Err(self.error(format!("Expected an element, {}", self.found())))
        }
    }

    fn fragment(&mut self) -> Result<JsxNode, RenderError> {
        self.expect("<>")?;
        let (children, closing) = self.children()?;
        if !closing.is_empty() {
            return Err(self.error(format!(
                "Mismatched closing tag: expected </>, found </{closing}>"
            )));
        }
        Ok(JsxNode::Fragment { children })
    }

    fn element(&mut self) -> Result<JsxNode, RenderError> {
        self.expect("<")?;
        let tag = self.ident()?;
        let attrs = self.attrs()?;
        self.skip_ws();
        if self.eat("/>") {
            return Ok(JsxNode::Element {
                tag,
                attrs,
                children: Vec::new(),
            });
        }
        self.expect(">")?;
        let (children, closing) = self.children()?;
        if closing != tag {
            return Err(self.error(format!(
                "Mismatched closing tag: expected </{tag}>, found </{closing}>"
            )));
        }
        Ok(JsxNode::Element {
            tag,
            attrs,
            children,
        })
    }

    /// Parses children up to and including the closing tag, returning the
    /// closing tag's name (empty for `</>`).
    fn children(&mut self) -> Result<(Vec<JsxNode>, String), RenderError> {
        let mut children = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return Err(self.error("Unexpected end of input inside element children"))
                }
                Some(b'}') => return Err(self.error("Unexpected '}' in element children")),
                Some(b'<') => {
                    if self.starts_with("</") {
                        self.eat("</");
                        self.skip_ws();
                        if self.eat(">") {
                            return Ok((children, String::new()));
                        }
                        let name = self.ident()?;
                        self.skip_ws();
                        self.expect(">")?;
                        return Ok((children, name));
                    }
                    children.push(self.jsx_node()?);
                }
                Some(b'{') => {
                    if self.try_comment()? {
                        continue;
                    }
                    self.eat("{");
                    self.skip_ws();
                    let expr = self.expr()?;
                    self.skip_ws();
                    self.expect("}")?;
                    children.push(JsxNode::Expr(expr));
                }
                Some(_) => {
                    let start = self.idx;
                    while !matches!(self.peek(), None | Some(b'<' | b'{' | b'}')) {
                        self.advance();
                    }
                    let text = self.input[start..self.idx].trim();
                    if !text.is_empty() {
                        children.push(JsxNode::Text(text.to_string()));
                    }
                }
            }
        }
    }

    /// Consumes a `{/* ... */}` block if one starts here.
    fn try_comment(&mut self) -> Result<bool, RenderError> {
        let mut j = self.idx + 1;
        while matches!(self.bytes.get(j), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            j += 1;
        }
        if !(self.bytes.get(j) == Some(&b'/') && self.bytes.get(j + 1) == Some(&b'*')) {
            return Ok(false);
        }
        self.eat("{");
        self.skip_ws();
        self.eat("/*");
        while !self.starts_with("*/") {
            if self.peek().is_none() {
                return Err(self.error("Unterminated comment"));
            }
            self.advance();
        }
        self.eat("*/");
        self.skip_ws();
        self.expect("}")?;
        Ok(true)
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    fn attrs(&mut self) -> Result<Vec<Attr>, RenderError> {
        let mut attrs = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                None | Some(b'>') | Some(b'/') => return Ok(attrs),
                Some(b) if is_ident_start(b) => {
                    let name = self.attr_name()?;
                    self.skip_ws();
                    if !self.eat("=") {
                        attrs.push(Attr {
                            name,
                            value: AttrValue::Flag,
                        });
                        continue;
                    }
                    self.skip_ws();
                    let value = match self.peek() {
                        Some(b'"') => AttrValue::Literal(self.string_literal(b'"')?),
                        Some(b'\'') => AttrValue::Literal(self.string_literal(b'\'')?),
                        Some(b'{') => {
                            self.eat("{");
                            self.skip_ws();
                            let expr = self.expr()?;
                            self.skip_ws();
                            self.expect("}")?;
                            AttrValue::Expr(expr)
                        }
                        _ => {
                            return Err(self.error(format!(
                                "Expected an attribute value, {}",
                                self.found()
                            )))
                        }
                    };
                    attrs.push(Attr { name, value });
                }
                _ => {
                    return Err(self.error(format!(
                        "Expected an attribute name, {}",
                        self.found()
                    )))
                }
            }
        }
    }

    /// Attribute names are identifiers with optional dashed segments
    /// (`data-variant`, `aria-label`).
    fn attr_name(&mut self) -> Result<String, RenderError> {
        let start = self.idx;
        self.ident()?;
        while self.peek() == Some(b'-') {
            self.advance();
            self.ident()?;
        }
        Ok(self.input[start..self.idx].to_string())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expr(&mut self) -> Result<Expr, RenderError> {
        match self.peek() {
            Some(b'"') => self.string_literal(b'"').map(Expr::Str),
            Some(b'\'') => self.string_literal(b'\'').map(Expr::Str),
            Some(b) if b.is_ascii_digit() || b == b'-' => self.number(),
            Some(b) if is_ident_start(b) => {
                let name = self.ident()?;
                match name.as_str() {
                    "true" => Ok(Expr::Bool(true)),
                    "false" => Ok(Expr::Bool(false)),
                    "null" => Ok(Expr::Null),
                    _ => {
                        self.skip_ws();
                        if self.starts_with("(") {
                            let args = self.call_args()?;
                            Ok(Expr::Call { callee: name, args })
                        } else {
                            Ok(Expr::Ident(name))
                        }
                    }
                }
            }
            _ => Err(self.error(format!("Expected an expression, {}", self.found()))),
        }
    }

    fn call_args(&mut self) -> Result<Vec<Expr>, RenderError> {
        self.expect("(")?;
        self.skip_ws();
        let mut args = Vec::new();
        if self.eat(")") {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            self.skip_ws();
            if self.eat(",") {
                self.skip_ws();
                continue;
            }
            self.expect(")")?;
            return Ok(args);
        }
    }

    fn string_literal(&mut self, quote: u8) -> Result<String, RenderError> {
        self.advance();
        let mut out = String::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => return Err(self.error("Unterminated string literal")),
                Some(b'\\') => {
                    self.advance();
                    match self.current_char() {
                        None => return Err(self.error("Unterminated string literal")),
                        Some(c) => {
                            out.push(match c {
                                'n' => '\n',
                                't' => '\t',
                                other => other,
                            });
                            self.advance_char(c);
                        }
                    }
                }
                Some(b) if b == quote => {
                    self.advance();
                    return Ok(out);
                }
                Some(_) => {
                    if let Some(c) = self.current_char() {
                        out.push(c);
                        self.advance_char(c);
                    }
                }
            }
        }
    }

    fn number(&mut self) -> Result<Expr, RenderError> {
        let start = self.idx;
        if self.peek() == Some(b'-') {
            self.advance();
        }
        let digits = self.idx;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.advance();
        }
        if self.idx == digits {
            return Err(self.error(format!("Expected a number, {}", self.found())));
        }
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b) if b.is_ascii_digit()) {
            self.advance();
            while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = &self.input[start..self.idx];
        text.parse::<f64>()
            .map(Expr::Num)
            .map_err(|_| self.error(format!("Invalid number literal '{text}'")))
    }

    fn ident(&mut self) -> Result<String, RenderError> {
        let start = self.idx;
        match self.peek() {
            Some(b) if is_ident_start(b) => self.advance(),
            _ => return Err(self.error(format!("Expected an identifier, {}", self.found()))),
        }
        while matches!(self.peek(), Some(b) if is_ident_continue(b)) {
            self.advance();
        }
        Ok(self.input[start..self.idx].to_string())
    }

    // ========================================================================
    // Scanner
    // ========================================================================

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.idx).copied()
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.idx + n).copied()
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.idx..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(b) = self.peek() {
            self.idx += 1;
            if b == b'\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }

    fn advance_char(&mut self, c: char) {
        for _ in 0..c.len_utf8() {
            self.advance();
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.advance();
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.idx..].starts_with(s)
    }

    /// Like `starts_with`, but for keywords: the match must not continue
    /// into a longer identifier.
    fn lookahead_is(&self, keyword: &str) -> bool {
        self.starts_with(keyword)
            && !matches!(self.bytes.get(self.idx + keyword.len()), Some(&b) if is_ident_continue(b))
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            for _ in 0..s.len() {
                self.advance();
            }
            true
        } else {
            false
        }
    }

    fn expect(&mut self, s: &str) -> Result<(), RenderError> {
        if self.eat(s) {
            Ok(())
        } else {
            Err(self.error(format!("Expected '{s}', {}", self.found())))
        }
    }

    fn found(&self) -> String {
        match self.current_char() {
            Some(c) => format!("found '{c}'"),
            None => "found end of input".to_string(),
        }
    }

    fn error(&self, message: impl Into<String>) -> RenderError {
        RenderError::Parse {
            line: self.line,
            column: self.col,
            message: message.into(),
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}
