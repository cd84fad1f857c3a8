//! SQL keywords the terminator analyzers care about.
//!
//! Only the words that open or close a scripting block (or that appear in
//! the `CREATE PROCEDURE` header leading up to one) are listed. Everything
//! else comes out of the keyword tokenizer as a plain word.
//!
//! Keywords compare case-insensitively; `as_str` is the canonical upper-case
//! spelling, which is also what the tokenizer produces with its default case
//! normalization.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    As,
    Begin,
    Case,
    Create,
    Declare,
    Do,
    End,
    Execute,
    For,
    Function,
    If,
    Language,
    Loop,
    Name,
    Or,
    Procedure,
    Repeat,
    Replace,
    Secure,
    Sql,
    Temp,
    Temporary,
    Transaction,
    When,
    While,
    Work,
}

impl Keyword {
    /// Words that, following `BEGIN`, make it a transaction statement rather
    /// than the start of a block.
    pub const BEGIN_TRANSACTION: [Self; 3] = [Keyword::Transaction, Keyword::Work, Keyword::Name];

    /// Classify a word, ignoring ASCII case.
    pub fn from_word(word: &str) -> Option<Self> {
        use Keyword::*;
        let kw = match word.to_ascii_uppercase().as_str() {
            "AS" => As,
            "BEGIN" => Begin,
            "CASE" => Case,
            "CREATE" => Create,
            "DECLARE" => Declare,
            "DO" => Do,
            "END" => End,
            "EXECUTE" => Execute,
            "FOR" => For,
            "FUNCTION" => Function,
            "IF" => If,
            "LANGUAGE" => Language,
            "LOOP" => Loop,
            "NAME" => Name,
            "OR" => Or,
            "PROCEDURE" => Procedure,
            "REPEAT" => Repeat,
            "REPLACE" => Replace,
            "SECURE" => Secure,
            "SQL" => Sql,
            "TEMP" => Temp,
            "TEMPORARY" => Temporary,
            "TRANSACTION" => Transaction,
            "WHEN" => When,
            "WHILE" => While,
            "WORK" => Work,
            _ => return None,
        };
        Some(kw)
    }

    /// Canonical upper-case spelling.
    pub const fn as_str(self) -> &'static str {
        use Keyword::*;
        match self {
            As => "AS",
            Begin => "BEGIN",
            Case => "CASE",
            Create => "CREATE",
            Declare => "DECLARE",
            Do => "DO",
            End => "END",
            Execute => "EXECUTE",
            For => "FOR",
            Function => "FUNCTION",
            If => "IF",
            Language => "LANGUAGE",
            Loop => "LOOP",
            Name => "NAME",
            Or => "OR",
            Procedure => "PROCEDURE",
            Repeat => "REPEAT",
            Replace => "REPLACE",
            Secure => "SECURE",
            Sql => "SQL",
            Temp => "TEMP",
            Temporary => "TEMPORARY",
            Transaction => "TRANSACTION",
            When => "WHEN",
            While => "WHILE",
            Work => "WORK",
        }
    }
}

impl AsRef<str> for Keyword {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
