//! Lexer (tokenizer) for C source code
//!
//! Converts raw source text into a stream of [`Token`]s pulled one at a time
//! by the parser. `#include` and other preprocessor directives are silently
//! skipped rather than parsed. Lexical errors are reported through the
//! diagnostics sink and the offending character skipped, so the stream
//! always continues to a well-formed end-of-file token that is safe to peek
//! repeatedly.
//!
//! The lexer also owns the operator precedence table: every binary or
//! ternary operator token exposes a left and right binding power
//! ([`TokenKind::prec_l`] / [`TokenKind::prec_r`]) consumed by the
//! precedence-climbing expression parser.

use crate::diag::{Diagnostics, Pos, Span};
use std::fmt;

/// Binding power levels for the expression parser, weakest first.
///
/// `Error` is below everything: it is what a non-operator token reports as
/// its left binding power, which is how the climb loop knows to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Prec {
    Error,
    Bottom,
    Comma,
    Assignment,
    Conditional,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Unary,
    Postfix,
    Top,
}

/// All token variants produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals; integer constants carry their numeric value, character and
    // string constants carry their raw source text including quotes.
    Integer(u64),
    Character(String),
    StrLiteral(String),

    // Identifiers
    Ident(String),

    // Keywords
    KwVoid,
    KwChar,
    KwInt,
    KwStruct,
    KwIf,
    KwElse,
    KwWhile,
    KwBreak,
    KwContinue,
    KwReturn,
    KwGoto,
    KwSizeof,

    // Delimiters
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,

    // Punctuators
    Dot,       // .
    Arrow,     // ->
    Colon,     // :
    Semicolon, // ;
    Comma,     // ,
    Inc,       // ++
    Dec,       // --
    Not,       // !
    BitNot,    // ~

    // Operators with precedence metadata
    Star,     // *
    Slash,    // /
    Percent,  // %
    Plus,     // +
    Minus,    // -
    Shl,      // <<
    Shr,      // >>
    Lt,       // <
    Gt,       // >
    Le,       // <=
    Ge,       // >=
    EqEq,     // ==
    Ne,       // !=
    Amp,      // &
    Caret,    // ^
    Pipe,     // |
    AndAnd,   // &&
    OrOr,     // ||
    Question, // ?

    Assign,        // =
    PlusAssign,    // +=
    MinusAssign,   // -=
    StarAssign,    // *=
    SlashAssign,   // /=
    PercentAssign, // %=
    AmpAssign,     // &=
    PipeAssign,    // |=
    CaretAssign,   // ^=
    ShlAssign,     // <<=
    ShrAssign,     // >>=

    // End of input
    Eof,
}

impl TokenKind {
    /// Left binding power: how strongly this token pulls on an expression to
    /// its left. `Prec::Error` for anything that is not an infix operator.
    pub fn prec_l(&self) -> Prec {
        use TokenKind::*;
        match self {
            Star | Slash | Percent => Prec::Multiplicative,
            Plus | Minus => Prec::Additive,
            Shl | Shr => Prec::Shift,
            Lt | Gt | Le | Ge => Prec::Relational,
            EqEq | Ne => Prec::Equality,
            Amp => Prec::BitwiseAnd,
            Caret => Prec::BitwiseXor,
            Pipe => Prec::BitwiseOr,
            AndAnd => Prec::LogicalAnd,
            OrOr => Prec::LogicalOr,
            Question => Prec::Conditional,
            Assign | PlusAssign | MinusAssign | StarAssign | SlashAssign
            | PercentAssign | AmpAssign | PipeAssign | CaretAssign | ShlAssign
            | ShrAssign => Prec::Assignment,
            _ => Prec::Error,
        }
    }

    /// Right binding power: the minimum precedence used when parsing this
    /// operator's right-hand side. One level tighter than the left binding
    /// power for left-associative operators, at or below it for the
    /// right-associative ones (`?:` and the assignments).
    pub fn prec_r(&self) -> Prec {
        use TokenKind::*;
        match self {
            Star | Slash | Percent => Prec::Unary,
            Plus | Minus => Prec::Multiplicative,
            Shl | Shr => Prec::Additive,
            Lt | Gt | Le | Ge => Prec::Shift,
            EqEq | Ne => Prec::Relational,
            Amp => Prec::Equality,
            Caret => Prec::BitwiseAnd,
            Pipe => Prec::BitwiseXor,
            AndAnd => Prec::BitwiseOr,
            OrOr => Prec::LogicalAnd,
            Question => Prec::Assignment,
            Assign | PlusAssign | MinusAssign | StarAssign | SlashAssign
            | PercentAssign | AmpAssign | PipeAssign | CaretAssign | ShlAssign
            | ShrAssign => Prec::Comma,
            _ => Prec::Error,
        }
    }

    /// True for `void`, `char`, `int`, and `struct`: the tokens that can
    /// begin a declaration specifier.
    pub fn starts_type(&self) -> bool {
        matches!(
            self,
            TokenKind::KwVoid | TokenKind::KwChar | TokenKind::KwInt | TokenKind::KwStruct
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        match self {
            Integer(n) => write!(f, "integer constant {}", n),
            Character(c) => write!(f, "character constant {}", c),
            StrLiteral(s) => write!(f, "string literal {}", s),
            Ident(s) => write!(f, "identifier '{}'", s),
            KwVoid => write!(f, "'void'"),
            KwChar => write!(f, "'char'"),
            KwInt => write!(f, "'int'"),
            KwStruct => write!(f, "'struct'"),
            KwIf => write!(f, "'if'"),
            KwElse => write!(f, "'else'"),
            KwWhile => write!(f, "'while'"),
            KwBreak => write!(f, "'break'"),
            KwContinue => write!(f, "'continue'"),
            KwReturn => write!(f, "'return'"),
            KwGoto => write!(f, "'goto'"),
            KwSizeof => write!(f, "'sizeof'"),
            LBrace => write!(f, "'{{'"),
            RBrace => write!(f, "'}}'"),
            LParen => write!(f, "'('"),
            RParen => write!(f, "')'"),
            LBracket => write!(f, "'['"),
            RBracket => write!(f, "']'"),
            Dot => write!(f, "'.'"),
            Arrow => write!(f, "'->'"),
            Colon => write!(f, "':'"),
            Semicolon => write!(f, "';'"),
            Comma => write!(f, "','"),
            Inc => write!(f, "'++'"),
            Dec => write!(f, "'--'"),
            Not => write!(f, "'!'"),
            BitNot => write!(f, "'~'"),
            Star => write!(f, "'*'"),
            Slash => write!(f, "'/'"),
            Percent => write!(f, "'%'"),
            Plus => write!(f, "'+'"),
            Minus => write!(f, "'-'"),
            Shl => write!(f, "'<<'"),
            Shr => write!(f, "'>>'"),
            Lt => write!(f, "'<'"),
            Gt => write!(f, "'>'"),
            Le => write!(f, "'<='"),
            Ge => write!(f, "'>='"),
            EqEq => write!(f, "'=='"),
            Ne => write!(f, "'!='"),
            Amp => write!(f, "'&'"),
            Caret => write!(f, "'^'"),
            Pipe => write!(f, "'|'"),
            AndAnd => write!(f, "'&&'"),
            OrOr => write!(f, "'||'"),
            Question => write!(f, "'?'"),
            Assign => write!(f, "'='"),
            PlusAssign => write!(f, "'+='"),
            MinusAssign => write!(f, "'-='"),
            StarAssign => write!(f, "'*='"),
            SlashAssign => write!(f, "'/='"),
            PercentAssign => write!(f, "'%='"),
            AmpAssign => write!(f, "'&='"),
            PipeAssign => write!(f, "'|='"),
            CaretAssign => write!(f, "'^='"),
            ShlAssign => write!(f, "'<<='"),
            ShrAssign => write!(f, "'>>='"),
            Eof => write!(f, "end of file"),
        }
    }
}

/// One token: kind plus the source region it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// Lexer for C source code.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Pull the next token, reporting lexical errors to `diags`.
    ///
    /// Returns an `Eof` token at the end of input and keeps returning it on
    /// every subsequent call.
    pub fn next_token(&mut self, diags: &mut Diagnostics) -> Token {
        loop {
            self.skip_whitespace_and_comments(diags);

            if self.is_at_end() {
                return Token::new(TokenKind::Eof, Span::at(self.current_pos()));
            }

            // Preprocessor directives are outside the subset; skip the line.
            if self.peek() == Some('#') {
                self.skip_to_end_of_line();
                continue;
            }

            if let Some(token) = self.scan_token(diags) {
                return token;
            }
            // scan_token reported an error and skipped past it; retry.
        }
    }

    fn scan_token(&mut self, diags: &mut Diagnostics) -> Option<Token> {
        let begin = self.current_pos();
        let ch = self.advance()?;

        let kind = match ch {
            '"' => return self.string_literal(begin, diags),
            '\'' => return self.char_literal(begin, diags),
            '0'..='9' => return Some(self.number_literal(ch, begin, diags)),
            'a'..='z' | 'A'..='Z' | '_' => {
                return Some(self.identifier_or_keyword(ch, begin))
            }

            '+' => {
                if self.eat_char('+') {
                    TokenKind::Inc
                } else if self.eat_char('=') {
                    TokenKind::PlusAssign
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat_char('-') {
                    TokenKind::Dec
                } else if self.eat_char('=') {
                    TokenKind::MinusAssign
                } else if self.eat_char('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.eat_char('=') {
                    TokenKind::StarAssign
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                if self.eat_char('=') {
                    TokenKind::SlashAssign
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.eat_char('=') {
                    TokenKind::PercentAssign
                } else {
                    TokenKind::Percent
                }
            }
            '=' => {
                if self.eat_char('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.eat_char('=') {
                    TokenKind::Ne
                } else {
                    TokenKind::Not
                }
            }
            '<' => {
                if self.eat_char('=') {
                    TokenKind::Le
                } else if self.eat_char('<') {
                    if self.eat_char('=') {
                        TokenKind::ShlAssign
                    } else {
                        TokenKind::Shl
                    }
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.eat_char('=') {
                    TokenKind::Ge
                } else if self.eat_char('>') {
                    if self.eat_char('=') {
                        TokenKind::ShrAssign
                    } else {
                        TokenKind::Shr
                    }
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.eat_char('&') {
                    TokenKind::AndAnd
                } else if self.eat_char('=') {
                    TokenKind::AmpAssign
                } else {
                    TokenKind::Amp
                }
            }
            '|' => {
                if self.eat_char('|') {
                    TokenKind::OrOr
                } else if self.eat_char('=') {
                    TokenKind::PipeAssign
                } else {
                    TokenKind::Pipe
                }
            }
            '^' => {
                if self.eat_char('=') {
                    TokenKind::CaretAssign
                } else {
                    TokenKind::Caret
                }
            }
            '~' => TokenKind::BitNot,
            '.' => TokenKind::Dot,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,

            _ => {
                diags.report(Span::at(begin), format!("unexpected character '{}'", ch));
                return None;
            }
        };

        Some(Token::new(kind, Span::new(begin, self.prev_pos())))
    }

    /// Scan a string literal. The raw text including quotes is kept so the
    /// printer can reproduce it verbatim.
    fn string_literal(&mut self, begin: Pos, diags: &mut Diagnostics) -> Option<Token> {
        let mut raw = String::from('"');

        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
            raw.push(ch);
            if ch == '\\' {
                if let Some(escaped) = self.advance() {
                    raw.push(escaped);
                }
                continue;
            }
            if ch == '"' {
                let span = Span::new(begin, self.prev_pos());
                return Some(Token::new(TokenKind::StrLiteral(raw), span));
            }
        }

        diags.report(Span::at(begin), "unterminated string literal");
        None
    }

    /// Scan a character constant, raw text kept like string literals.
    fn char_literal(&mut self, begin: Pos, diags: &mut Diagnostics) -> Option<Token> {
        let mut raw = String::from('\'');

        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
            raw.push(ch);
            if ch == '\\' {
                if let Some(escaped) = self.advance() {
                    raw.push(escaped);
                }
                continue;
            }
            if ch == '\'' {
                if raw.len() < 3 {
                    diags.report(Span::at(begin), "empty character constant");
                    return None;
                }
                let span = Span::new(begin, self.prev_pos());
                return Some(Token::new(TokenKind::Character(raw), span));
            }
        }

        diags.report(Span::at(begin), "unterminated character constant");
        None
    }

    /// Scan a decimal integer constant.
    fn number_literal(&mut self, first_digit: char, begin: Pos, diags: &mut Diagnostics) -> Token {
        let mut num_str = String::new();
        num_str.push(first_digit);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let span = Span::new(begin, self.prev_pos());
        let value = match num_str.parse::<u64>() {
            Ok(v) => v,
            Err(_) => {
                diags.report(span, format!("integer constant '{}' out of range", num_str));
                0
            }
        };

        Token::new(TokenKind::Integer(value), span)
    }

    /// Scan an identifier or keyword.
    fn identifier_or_keyword(&mut self, first_char: char, begin: Pos) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match ident.as_str() {
            "void" => TokenKind::KwVoid,
            "char" => TokenKind::KwChar,
            "int" => TokenKind::KwInt,
            "struct" => TokenKind::KwStruct,
            "if" => TokenKind::KwIf,
            "else" => TokenKind::KwElse,
            "while" => TokenKind::KwWhile,
            "break" => TokenKind::KwBreak,
            "continue" => TokenKind::KwContinue,
            "return" => TokenKind::KwReturn,
            "goto" => TokenKind::KwGoto,
            "sizeof" => TokenKind::KwSizeof,
            _ => TokenKind::Ident(ident),
        };

        Token::new(kind, Span::new(begin, self.prev_pos()))
    }

    fn skip_whitespace_and_comments(&mut self, diags: &mut Diagnostics) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_to_end_of_line();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment(diags);
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    fn skip_to_end_of_line(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self, diags: &mut Diagnostics) {
        let start = self.current_pos();
        self.advance(); // '/'
        self.advance(); // '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return;
            }
            self.advance();
        }

        diags.report(Span::at(start), "unterminated block comment");
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn eat_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_pos(&self) -> Pos {
        Pos::new(self.line, self.column)
    }

    /// Position of the last consumed character.
    fn prev_pos(&self) -> Pos {
        if self.column > 1 {
            Pos::new(self.line, self.column - 1)
        } else {
            Pos::new(self.line, self.column)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::Diagnostics;

    fn tokenize(source: &str) -> (Vec<TokenKind>, Diagnostics) {
        let mut diags = Diagnostics::new("<test>");
        let mut lexer = Lexer::new(source);
        let mut kinds = Vec::new();
        loop {
            let tok = lexer.next_token(&mut diags);
            let done = tok.kind == TokenKind::Eof;
            kinds.push(tok.kind);
            if done {
                break;
            }
        }
        (kinds, diags)
    }

    #[test]
    fn test_simple_tokens() {
        let (kinds, diags) = tokenize("int main(void) { return 0; }");
        assert!(diags.is_clean());
        assert_eq!(
            kinds,
            vec![
                TokenKind::KwInt,
                TokenKind::Ident("main".to_string()),
                TokenKind::LParen,
                TokenKind::KwVoid,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::KwReturn,
                TokenKind::Integer(0),
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        let (kinds, diags) = tokenize("++ -- += <<= << <= == != && || -> .");
        assert!(diags.is_clean());
        assert_eq!(
            kinds,
            vec![
                TokenKind::Inc,
                TokenKind::Dec,
                TokenKind::PlusAssign,
                TokenKind::ShlAssign,
                TokenKind::Shl,
                TokenKind::Le,
                TokenKind::EqEq,
                TokenKind::Ne,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Arrow,
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_and_preprocessor() {
        let (kinds, diags) =
            tokenize("#include <stdio.h>\nint x; // trailing\n/* block\n */ int y;");
        assert!(diags.is_clean());
        assert_eq!(
            kinds,
            vec![
                TokenKind::KwInt,
                TokenKind::Ident("x".to_string()),
                TokenKind::Semicolon,
                TokenKind::KwInt,
                TokenKind::Ident("y".to_string()),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_literals_keep_raw_text() {
        let (kinds, diags) = tokenize(r#"'a' '\n' "hi\n" 42"#);
        assert!(diags.is_clean());
        assert_eq!(
            kinds,
            vec![
                TokenKind::Character("'a'".to_string()),
                TokenKind::Character("'\\n'".to_string()),
                TokenKind::StrLiteral("\"hi\\n\"".to_string()),
                TokenKind::Integer(42),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_bad_character_is_reported_and_skipped() {
        let (kinds, diags) = tokenize("int @ x;");
        assert_eq!(diags.error_count(), 1);
        assert_eq!(
            kinds,
            vec![
                TokenKind::KwInt,
                TokenKind::Ident("x".to_string()),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let (_, diags) = tokenize("\"abc");
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn test_precedence_table_ordering() {
        assert!(TokenKind::Star.prec_l() > TokenKind::Plus.prec_l());
        assert!(TokenKind::Plus.prec_l() > TokenKind::Shl.prec_l());
        assert!(TokenKind::EqEq.prec_l() < TokenKind::Lt.prec_l());
        assert!(TokenKind::Assign.prec_l() < TokenKind::OrOr.prec_l());
        // Left-associative: right binding power one level tighter.
        assert!(TokenKind::Plus.prec_r() > TokenKind::Plus.prec_l());
        // Right-associative: right binding power below its own level.
        assert!(TokenKind::Assign.prec_r() < TokenKind::Assign.prec_l());
        // Non-operators stop the climb.
        assert_eq!(TokenKind::Semicolon.prec_l(), Prec::Error);
    }
}
