use alto_core::{TextRange, TextSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident,
    QuotedIdent,
    Int,
    Decimal,
    String,
    Punct,
    Eof,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Start of the trivia preceding this token.
    pub full_start: TextSize,
    pub range: TextRange,
}

const PUNCT2: [&str; 10] = [":=", "+=", "-=", "*=", "/=", "::", "..", "<>", "<=", ">="];

pub(crate) fn lex(text: &str) -> Vec<Token> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;
    let mut full_start = 0usize;

    loop {
        // Trivia.
        loop {
            match bytes.get(i) {
                Some(b) if b.is_ascii_whitespace() => i += 1,
                Some(b'/') if bytes.get(i + 1) == Some(&b'/') => {
                    while i < bytes.len() && bytes[i] != b'\n' {
                        i += 1;
                    }
                }
                Some(b'/') if bytes.get(i + 1) == Some(&b'*') => {
                    i += 2;
                    while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                        i += 1;
                    }
                    i = (i + 2).min(bytes.len());
                }
                _ => break,
            }
        }

        let start = i;
        let Some(&b) = bytes.get(i) else {
            tokens.push(token(TokenKind::Eof, full_start, start, start));
            return tokens;
        };

        let kind = if b.is_ascii_alphabetic() || b == b'_' {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            TokenKind::Ident
        } else if b == b'"' {
            i += 1;
            while i < bytes.len() && bytes[i] != b'"' {
                i += 1;
            }
            i = (i + 1).min(bytes.len());
            TokenKind::QuotedIdent
        } else if b == b'\'' {
            i += 1;
            loop {
                match bytes.get(i) {
                    None => break,
                    Some(b'\'') if bytes.get(i + 1) == Some(&b'\'') => i += 2,
                    Some(b'\'') => {
                        i += 1;
                        break;
                    }
                    Some(_) => i += 1,
                }
            }
            TokenKind::String
        } else if b.is_ascii_digit() {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            // `1..5` is a range, not a decimal.
            if bytes.get(i) == Some(&b'.') && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                TokenKind::Decimal
            } else {
                TokenKind::Int
            }
        } else {
            let rest = &text[i..];
            let len = PUNCT2
                .iter()
                .find(|p| rest.starts_with(**p))
                .map_or_else(|| rest.chars().next().map_or(1, char::len_utf8), |p| p.len());
            i += len;
            TokenKind::Punct
        };

        tokens.push(token(kind, full_start, start, i));
        full_start = i;
    }
}

fn token(kind: TokenKind, full_start: usize, start: usize, end: usize) -> Token {
    Token {
        kind,
        full_start: TextSize::from(full_start as u32),
        range: TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_text(text: &str) -> Vec<(TokenKind, &str)> {
        lex(text)
            .into_iter()
            .map(|t| {
                let r = t.range;
                (t.kind, &text[u32::from(r.start()) as usize..u32::from(r.end()) as usize])
            })
            .collect()
    }

    #[test]
    fn lexes_al_punctuation_and_literals() {
        let toks = kinds_and_text("x := 'it''s' + \"No.\"; // c\n1..2.5");
        assert_eq!(
            toks,
            vec![
                (TokenKind::Ident, "x"),
                (TokenKind::Punct, ":="),
                (TokenKind::String, "'it''s'"),
                (TokenKind::Punct, "+"),
                (TokenKind::QuotedIdent, "\"No.\""),
                (TokenKind::Punct, ";"),
                (TokenKind::Int, "1"),
                (TokenKind::Punct, ".."),
                (TokenKind::Decimal, "2.5"),
                (TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn trivia_is_attached_to_the_next_token() {
        let toks = lex("a /* b */ c");
        assert_eq!(toks[1].full_start, TextSize::from(1));
        assert_eq!(toks[1].range.start(), TextSize::from(10));
    }
}
