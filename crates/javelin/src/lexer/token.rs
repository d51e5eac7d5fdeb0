use crate::syntax::TextRange;
use compact_str::CompactString;
use logos::Logos;

/// Kind of a token.
///
/// The discriminant doubles as the terminal column of the action table, so the
/// grammar's terminals and this enum cannot drift apart: every quoted terminal in the
/// grammar must resolve through [`TokenKind::from_grammar_name`].
///
/// A few variants are never produced by the logos automaton:
///
/// - [`TokenKind::Eof`] and the goal markers are synthesized by the scanner and the driver.
/// - The restricted module keywords are lexed as identifiers and promoted by the
///   scanner when it runs in module-info mode.
/// - Comment and unterminated variants are consumed inside the scanner and never reach
///   the parser.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
#[logos(skip r"([ \t\r\n\x0C]+|//[^\n\r]*)")]
pub enum TokenKind {
    Eof = 0,

    // Goal markers
    UnitGoal,
    HeadersGoal,
    MethodBodyGoal,
    ConstructorBodyGoal,
    StatementsGoal,
    InitializerGoal,
    ExpressionGoal,

    #[regex(r"[\p{L}\p{Nl}_$][\p{L}\p{Nl}\p{Mn}\p{Mc}\p{Nd}\p{Pc}$]*")]
    Identifier,

    // Literals
    #[regex(r"[0-9][0-9_]*")]
    #[regex(r"0[xX][0-9a-fA-F_]+")]
    #[regex(r"0[bB][01_]+")]
    IntegerLiteral,
    #[regex(r"[0-9][0-9_]*[lL]")]
    #[regex(r"0[xX][0-9a-fA-F_]+[lL]")]
    #[regex(r"0[bB][01_]+[lL]")]
    LongLiteral,
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?[fF]")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?[fF]")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9_]+[fF]")]
    #[regex(r"[0-9][0-9_]*[fF]")]
    FloatLiteral,
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?[dD]?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?[dD]?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9_]+[dD]?")]
    #[regex(r"[0-9][0-9_]*[dD]")]
    DoubleLiteral,
    #[regex(r"'([^'\\\n\r]|\\[^\n\r])*'")]
    CharLiteral,
    #[regex(r#""([^"\\\n\r]|\\[^\n\r])*""#)]
    StringLiteral,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // Keywords
    #[token("abstract")]
    Abstract,
    #[token("assert")]
    Assert,
    #[token("boolean")]
    Boolean,
    #[token("break")]
    Break,
    #[token("byte")]
    Byte,
    #[token("case")]
    Case,
    #[token("catch")]
    Catch,
    #[token("char")]
    Char,
    #[token("class")]
    Class,
    #[token("const")]
    Const,
    #[token("continue")]
    Continue,
    #[token("default")]
    Default,
    #[token("do")]
    Do,
    #[token("double")]
    Double,
    #[token("else")]
    Else,
    #[token("enum")]
    Enum,
    #[token("extends")]
    Extends,
    #[token("final")]
    Final,
    #[token("finally")]
    Finally,
    #[token("float")]
    Float,
    #[token("for")]
    For,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("implements")]
    Implements,
    #[token("import")]
    Import,
    #[token("instanceof")]
    Instanceof,
    #[token("int")]
    Int,
    #[token("interface")]
    Interface,
    #[token("long")]
    Long,
    #[token("native")]
    Native,
    #[token("new")]
    New,
    #[token("package")]
    Package,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("public")]
    Public,
    #[token("return")]
    Return,
    #[token("short")]
    Short,
    #[token("static")]
    Static,
    #[token("strictfp")]
    Strictfp,
    #[token("super")]
    Super,
    #[token("switch")]
    Switch,
    #[token("synchronized")]
    Synchronized,
    #[token("this")]
    This,
    #[token("throw")]
    Throw,
    #[token("throws")]
    Throws,
    #[token("transient")]
    Transient,
    #[token("try")]
    Try,
    #[token("void")]
    Void,
    #[token("volatile")]
    Volatile,
    #[token("while")]
    While,

    // Restricted keywords (module-info only)
    Module,
    Open,
    Requires,
    Transitive,
    To,
    Exports,
    Opens,
    Uses,
    Provides,
    With,

    // Separators
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("@")]
    At,
    #[token("::")]
    ColonColon,

    // Operators
    #[token("=")]
    Assign,
    #[token(">")]
    Greater,
    #[token("<")]
    Less,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("->")]
    Arrow,
    #[token("==")]
    EqEq,
    #[token("<=")]
    LessEq,
    #[token(">=")]
    GreaterEq,
    #[token("!=")]
    NotEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("%")]
    Percent,
    #[token("<<")]
    LessLess,
    #[token(">>")]
    GreaterGreater,
    #[token(">>>")]
    GreaterGreaterGreater,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,
    #[token("&=")]
    AmpAssign,
    #[token("|=")]
    PipeAssign,
    #[token("^=")]
    CaretAssign,
    #[token("%=")]
    PercentAssign,
    #[token("<<=")]
    LessLessAssign,
    #[token(">>=")]
    GreaterGreaterAssign,
    #[token(">>>=")]
    GreaterGreaterGreaterAssign,

    // Scanner-internal
    #[regex(r"/\*[^*]*\*+([^/*][^*]*\*+)*/")]
    Comment,
    #[regex(r"/\*\*[^*]*\*+([^/*][^*]*\*+)*/", priority = 20)]
    DocComment,
    #[regex(r"/\*([^*]|\*+[^*/])*\**")]
    UnterminatedComment,
    #[regex(r#""([^"\\\n\r]|\\[^\n\r])*"#)]
    UnterminatedString,
    #[regex(r"'([^'\\\n\r]|\\[^\n\r])*")]
    UnterminatedChar,
}

macro_rules! spellings {
    ($($kind:ident => $text:literal,)*) => {
        impl TokenKind {
            /// Fixed source spelling, for kinds that have one.
            #[must_use]
            pub const fn fixed_text(self) -> Option<&'static str> {
                match self {
                    $(Self::$kind => Some($text),)*
                    _ => None,
                }
            }

            fn from_fixed_text(text: &str) -> Option<Self> {
                match text {
                    $($text => Some(Self::$kind),)*
                    _ => None,
                }
            }
        }
    };
}

spellings! {
    True => "true", False => "false", Null => "null",
    Abstract => "abstract", Assert => "assert", Boolean => "boolean", Break => "break",
    Byte => "byte", Case => "case", Catch => "catch", Char => "char", Class => "class",
    Const => "const", Continue => "continue", Default => "default", Do => "do",
    Double => "double", Else => "else", Enum => "enum", Extends => "extends",
    Final => "final", Finally => "finally", Float => "float", For => "for", Goto => "goto",
    If => "if", Implements => "implements", Import => "import", Instanceof => "instanceof",
    Int => "int", Interface => "interface", Long => "long", Native => "native", New => "new",
    Package => "package", Private => "private", Protected => "protected", Public => "public",
    Return => "return", Short => "short", Static => "static", Strictfp => "strictfp",
    Super => "super", Switch => "switch", Synchronized => "synchronized", This => "this",
    Throw => "throw", Throws => "throws", Transient => "transient", Try => "try",
    Void => "void", Volatile => "volatile", While => "while",
    Module => "module", Open => "open", Requires => "requires", Transitive => "transitive",
    To => "to", Exports => "exports", Opens => "opens", Uses => "uses",
    Provides => "provides", With => "with",
    LParen => "(", RParen => ")", LBrace => "{", RBrace => "}", LBracket => "[",
    RBracket => "]", Semicolon => ";", Comma => ",", Dot => ".", Ellipsis => "...",
    At => "@", ColonColon => "::",
    Assign => "=", Greater => ">", Less => "<", Bang => "!", Tilde => "~",
    Question => "?", Colon => ":", Arrow => "->", EqEq => "==", LessEq => "<=",
    GreaterEq => ">=", NotEq => "!=", AndAnd => "&&", OrOr => "||", PlusPlus => "++",
    MinusMinus => "--", Plus => "+", Minus => "-", Star => "*", Slash => "/", Amp => "&",
    Pipe => "|", Caret => "^", Percent => "%", LessLess => "<<", GreaterGreater => ">>",
    GreaterGreaterGreater => ">>>", PlusAssign => "+=", MinusAssign => "-=",
    StarAssign => "*=", SlashAssign => "/=", AmpAssign => "&=", PipeAssign => "|=",
    CaretAssign => "^=", PercentAssign => "%=", LessLessAssign => "<<=",
    GreaterGreaterAssign => ">>=", GreaterGreaterGreaterAssign => ">>>=",
}

impl TokenKind {
    /// Number of kinds, which is also the width of the action table.
    pub const COUNT: usize = Self::UnterminatedChar as usize + 1;

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Resolves a terminal as written in the grammar source: a quoted spelling such as
    /// `'{'` or `'$unit'`, or a named terminal such as `Identifier`.
    #[must_use]
    pub fn from_grammar_name(name: &str) -> Option<Self> {
        if let Some(quoted) = name.strip_prefix('\'').and_then(|n| n.strip_suffix('\'')) {
            return match quoted {
                "$unit" => Some(Self::UnitGoal),
                "$headers" => Some(Self::HeadersGoal),
                "$method_body" => Some(Self::MethodBodyGoal),
                "$ctor_body" => Some(Self::ConstructorBodyGoal),
                "$statements" => Some(Self::StatementsGoal),
                "$initializer" => Some(Self::InitializerGoal),
                "$expression" => Some(Self::ExpressionGoal),
                other => Self::from_fixed_text(other),
            };
        }
        match name {
            "EOF" => Some(Self::Eof),
            "Identifier" => Some(Self::Identifier),
            "IntegerLiteral" => Some(Self::IntegerLiteral),
            "LongLiteral" => Some(Self::LongLiteral),
            "FloatLiteral" => Some(Self::FloatLiteral),
            "DoubleLiteral" => Some(Self::DoubleLiteral),
            "CharLiteral" => Some(Self::CharLiteral),
            "StringLiteral" => Some(Self::StringLiteral),
            _ => None,
        }
    }

    /// Restricted keyword for `text`, if it is one.
    #[must_use]
    pub fn restricted_keyword(text: &str) -> Option<Self> {
        match text {
            "module" => Some(Self::Module),
            "open" => Some(Self::Open),
            "requires" => Some(Self::Requires),
            "transitive" => Some(Self::Transitive),
            "to" => Some(Self::To),
            "exports" => Some(Self::Exports),
            "opens" => Some(Self::Opens),
            "uses" => Some(Self::Uses),
            "provides" => Some(Self::Provides),
            "with" => Some(Self::With),
            _ => None,
        }
    }

    /// How the kind is named in problem messages.
    #[must_use]
    pub fn describe(self) -> CompactString {
        match self {
            Self::Eof => "end of input".into(),
            Self::Identifier => "identifier".into(),
            Self::IntegerLiteral | Self::LongLiteral => "integer literal".into(),
            Self::FloatLiteral | Self::DoubleLiteral => "floating-point literal".into(),
            Self::CharLiteral | Self::UnterminatedChar => "character literal".into(),
            Self::StringLiteral | Self::UnterminatedString => "string literal".into(),
            Self::Comment | Self::DocComment | Self::UnterminatedComment => "comment".into(),
            Self::UnitGoal
            | Self::HeadersGoal
            | Self::MethodBodyGoal
            | Self::ConstructorBodyGoal
            | Self::StatementsGoal
            | Self::InitializerGoal
            | Self::ExpressionGoal => "start of input".into(),
            other => match other.fixed_text() {
                Some(text) => compact_str::format_compact!("'{text}'"),
                None => compact_str::format_compact!("{other:?}"),
            },
        }
    }

    #[must_use]
    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::IntegerLiteral
                | Self::LongLiteral
                | Self::FloatLiteral
                | Self::DoubleLiteral
                | Self::CharLiteral
                | Self::StringLiteral
        )
    }

    #[must_use]
    pub const fn is_keyword(self) -> bool {
        (self as u8) >= (Self::Abstract as u8) && (self as u8) <= (Self::With as u8)
    }

    #[must_use]
    pub const fn is_trivia(self) -> bool {
        matches!(self, Self::Comment | Self::DocComment | Self::UnterminatedComment)
    }
}

/// A token handed to the parser.
///
/// `range` is in original source coordinates even when the text went through unicode
/// escape decoding; `text` is the decoded spelling.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: CompactString,
    pub range: TextRange,
    pub value: TokenValue,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<CompactString>, range: TextRange) -> Self {
        Self {
            kind,
            text: text.into(),
            range,
            value: TokenValue::None,
        }
    }

    /// Zero-width token with no text, used for end of input and goal markers.
    #[must_use]
    pub fn synthetic(kind: TokenKind, range: TextRange) -> Self {
        Self::new(kind, CompactString::const_new(""), range)
    }

    #[must_use]
    pub const fn value(&self) -> &TokenValue {
        &self.value
    }
}

/// Decoded value of a literal token.
///
/// Integer and long literals both decode to [`TokenValue::Integer`]. Hex, octal and
/// binary literals are reinterpreted as two's complement of their width, so
/// `0xFFFFFFFF` is `-1`. The decimal literals `2147483648` and `9223372036854775808L`
/// can only appear as operands of unary minus: the first keeps its magnitude, the
/// second wraps to `i64::MIN`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenValue {
    None,
    Integer(i64),
    Float(f64),
    String(CompactString),
    Char(char),
    Bool(bool),
    Null,
}
