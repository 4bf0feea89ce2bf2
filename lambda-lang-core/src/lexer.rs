#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenKind {
    Illegal(String),
    Ident(String),
    Int(String),

    // Operators
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    Bang,

    Equal,
    NotEqual,

    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,

    And,
    Or,
    // The bare word `or`, distinct from the symbolic `||`
    OrWord,

    Comma,
    SemiColon,
    LParen,
    RParen,
    LBrace,
    RBrace,

    // Keywords
    Defun,
    Lambda,
    True,
    False,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

static KEYWORDS: phf::Map<&str, TokenKind> = phf::phf_map! {
    "Defun" => TokenKind::Defun,
    "lambd" => TokenKind::Lambda,
    "True" => TokenKind::True,
    "False" => TokenKind::False,
    "or" => TokenKind::OrWord,
    "not" => TokenKind::Bang,
};

#[derive(Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    iter: std::iter::Peekable<std::str::CharIndices<'a>>,
    bare_expression: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        let iter = input.char_indices().peekable();
        // Inputs with neither a definition nor a statement separator are a
        // single expression and get the precedence-climbing grammar.
        let bare_expression = !input.contains("Defun") && !input.contains(';');
        Self {
            input,
            iter,
            bare_expression,
        }
    }

    pub fn is_bare_expression(&self) -> bool {
        self.bare_expression
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        while self
            .iter
            .next_if(|(_, ch)| ch.is_ascii_alphanumeric())
            .is_some()
        {}

        let end = self.next_idx();
        let ident = &self.input[start..end];
        Token {
            kind: KEYWORDS
                .get(ident)
                .cloned()
                .unwrap_or_else(|| TokenKind::Ident(ident.to_owned())),
            start,
            end,
        }
    }

    fn read_number(&mut self, start: usize) -> Token {
        while self.iter.next_if(|(_, ch)| ch.is_ascii_digit()).is_some() {}

        let end = self.next_idx();
        let number = &self.input[start..end];

        Token {
            kind: TokenKind::Int(number.to_owned()),
            start,
            end,
        }
    }

    fn next_idx(&mut self) -> usize {
        self.iter
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }

    fn token(&mut self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            start,
            end: self.next_idx(),
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let mut iter = self.iter.by_ref().skip_while(|(_, ch)| ch.is_whitespace());

        if let Some((idx, ch)) = iter.next() {
            let tok = match ch {
                '+' => self.token(TokenKind::Plus, idx),
                '-' => self.token(TokenKind::Minus, idx),
                '*' => self.token(TokenKind::Asterisk, idx),
                '/' => self.token(TokenKind::Slash, idx),
                '%' => self.token(TokenKind::Percent, idx),
                ',' => self.token(TokenKind::Comma, idx),
                ';' => self.token(TokenKind::SemiColon, idx),
                '(' => self.token(TokenKind::LParen, idx),
                ')' => self.token(TokenKind::RParen, idx),
                '{' => self.token(TokenKind::LBrace, idx),
                '}' => self.token(TokenKind::RBrace, idx),
                '=' => {
                    if self.iter.next_if(|(_, ch)| *ch == '=').is_some() {
                        self.token(TokenKind::Equal, idx)
                    } else {
                        self.token(TokenKind::Illegal("=".to_owned()), idx)
                    }
                }
                '!' => {
                    if self.iter.next_if(|(_, ch)| *ch == '=').is_some() {
                        self.token(TokenKind::NotEqual, idx)
                    } else {
                        self.token(TokenKind::Bang, idx)
                    }
                }
                '>' => {
                    if self.iter.next_if(|(_, ch)| *ch == '=').is_some() {
                        self.token(TokenKind::GreaterEqual, idx)
                    } else {
                        self.token(TokenKind::GreaterThan, idx)
                    }
                }
                '<' => {
                    if self.iter.next_if(|(_, ch)| *ch == '=').is_some() {
                        self.token(TokenKind::LessEqual, idx)
                    } else {
                        self.token(TokenKind::LessThan, idx)
                    }
                }
                '&' => {
                    if self.iter.next_if(|(_, ch)| *ch == '&').is_some() {
                        self.token(TokenKind::And, idx)
                    } else {
                        self.token(TokenKind::Illegal("&".to_owned()), idx)
                    }
                }
                '|' => {
                    if self.iter.next_if(|(_, ch)| *ch == '|').is_some() {
                        self.token(TokenKind::Or, idx)
                    } else {
                        self.token(TokenKind::Illegal("|".to_owned()), idx)
                    }
                }
                c if c.is_ascii_alphabetic() => self.read_identifier(idx),
                c if c.is_ascii_digit() => self.read_number(idx),
                _ => self.token(TokenKind::Illegal(ch.to_string()), idx),
            };
            Some(tok)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Tokenizer::new(input).map(|token| token.kind).collect()
    }

    #[test]
    fn test_punctuation() {
        let input = "(){},;";
        let output = Tokenizer::new(input).collect::<Vec<_>>();

        assert_eq!(
            output,
            vec![
                Token {
                    kind: TokenKind::LParen,
                    start: 0,
                    end: 1
                },
                Token {
                    kind: TokenKind::RParen,
                    start: 1,
                    end: 2
                },
                Token {
                    kind: TokenKind::LBrace,
                    start: 2,
                    end: 3
                },
                Token {
                    kind: TokenKind::RBrace,
                    start: 3,
                    end: 4
                },
                Token {
                    kind: TokenKind::Comma,
                    start: 4,
                    end: 5
                },
                Token {
                    kind: TokenKind::SemiColon,
                    start: 5,
                    end: 6
                },
            ]
        );
    }

    #[test]
    fn test_definition() {
        let input = "Defun (Add,a,b)a+b";
        let expected_output = vec![
            TokenKind::Defun,
            TokenKind::LParen,
            TokenKind::Ident("Add".to_owned()),
            TokenKind::Comma,
            TokenKind::Ident("a".to_owned()),
            TokenKind::Comma,
            TokenKind::Ident("b".to_owned()),
            TokenKind::RParen,
            TokenKind::Ident("a".to_owned()),
            TokenKind::Plus,
            TokenKind::Ident("b".to_owned()),
        ];

        assert_eq!(kinds(input), expected_output);
    }

    #[test]
    fn test_operators() {
        let input = "!-/*%5; 5 < 10 >= 5 <= 1 != 2 == 2";
        let expected_output = vec![
            TokenKind::Bang,
            TokenKind::Minus,
            TokenKind::Slash,
            TokenKind::Asterisk,
            TokenKind::Percent,
            TokenKind::Int("5".to_owned()),
            TokenKind::SemiColon,
            TokenKind::Int("5".to_owned()),
            TokenKind::LessThan,
            TokenKind::Int("10".to_owned()),
            TokenKind::GreaterEqual,
            TokenKind::Int("5".to_owned()),
            TokenKind::LessEqual,
            TokenKind::Int("1".to_owned()),
            TokenKind::NotEqual,
            TokenKind::Int("2".to_owned()),
            TokenKind::Equal,
            TokenKind::Int("2".to_owned()),
        ];

        assert_eq!(kinds(input), expected_output);
    }

    #[test]
    fn test_logic_operators() {
        let input = "True && False || True";
        let expected_output = vec![
            TokenKind::True,
            TokenKind::And,
            TokenKind::False,
            TokenKind::Or,
            TokenKind::True,
        ];

        assert_eq!(kinds(input), expected_output);
    }

    #[test]
    fn test_keywords() {
        let input = "Defun lambd True False or not defun truthy";
        let expected_output = vec![
            TokenKind::Defun,
            TokenKind::Lambda,
            TokenKind::True,
            TokenKind::False,
            TokenKind::OrWord,
            TokenKind::Bang,
            TokenKind::Ident("defun".to_owned()),
            TokenKind::Ident("truthy".to_owned()),
        ];

        assert_eq!(kinds(input), expected_output);
    }

    #[test]
    fn test_lone_operator_characters_are_illegal() {
        assert_eq!(
            kinds("1 & 2"),
            vec![
                TokenKind::Int("1".to_owned()),
                TokenKind::Illegal("&".to_owned()),
                TokenKind::Int("2".to_owned()),
            ]
        );
        assert_eq!(kinds("|")[0], TokenKind::Illegal("|".to_owned()));
        assert_eq!(kinds("=")[0], TokenKind::Illegal("=".to_owned()));
        assert_eq!(kinds("#")[0], TokenKind::Illegal("#".to_owned()));
    }

    #[test]
    fn test_bare_expression_detection() {
        assert!(Tokenizer::new("Add(2,1)").is_bare_expression());
        assert!(Tokenizer::new("-30/6*5-2").is_bare_expression());
        assert!(!Tokenizer::new("Defun (Add,a,b)a+b").is_bare_expression());
        assert!(!Tokenizer::new("Add(2,1);Add(1,1)").is_bare_expression());
    }

    #[test]
    fn test_alphanumeric_identifier() {
        assert_eq!(
            kinds("repeat2(5)"),
            vec![
                TokenKind::Ident("repeat2".to_owned()),
                TokenKind::LParen,
                TokenKind::Int("5".to_owned()),
                TokenKind::RParen,
            ]
        );
    }
}
