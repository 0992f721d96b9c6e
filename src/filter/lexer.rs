use crate::errors::CacheError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Tok {
    Int(i64),
    Float(f64),
    Str(String),
    /// Raw text between backticks.
    Field(String),
    True,
    False,
    Null,
    And,
    Or,
    Not,
    Like,
    Is,
    In,
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    LParen,
    RParen,
    Comma,
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub tok: Tok,
    pub offset: usize,
}

/// Splits filter or order-by text into tokens. Keywords are case-insensitive.
pub(crate) fn tokenize(text: &str) -> Result<Vec<Token>, CacheError> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let (offset, c) = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        let tok = match c {
            '(' => {
                i += 1;
                Tok::LParen
            }
            ')' => {
                i += 1;
                Tok::RParen
            }
            ',' => {
                i += 1;
                Tok::Comma
            }
            '=' => {
                i += 1;
                Tok::Eq
            }
            '!' => {
                if matches!(chars.get(i + 1), Some((_, '='))) {
                    i += 2;
                    Tok::Ne
                } else {
                    return Err(CacheError::parse(offset, "expected '=' after '!'"));
                }
            }
            '<' => match chars.get(i + 1) {
                Some((_, '=')) => {
                    i += 2;
                    Tok::Lte
                }
                Some((_, '>')) => {
                    i += 2;
                    Tok::Ne
                }
                _ => {
                    i += 1;
                    Tok::Lt
                }
            },
            '>' => {
                if matches!(chars.get(i + 1), Some((_, '='))) {
                    i += 2;
                    Tok::Gte
                } else {
                    i += 1;
                    Tok::Gt
                }
            }
            '\'' => {
                let (s, next) = quoted(&chars, i)?;
                i = next;
                Tok::Str(s)
            }
            '`' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end].1 != '`' {
                    end += 1;
                }
                if end >= chars.len() {
                    return Err(CacheError::parse(offset, "unterminated field reference"));
                }
                i = end + 1;
                Tok::Field(chars[start..end].iter().map(|(_, c)| *c).collect())
            }
            c if c.is_ascii_digit() || (c == '-' && next_is_digit(&chars, i)) => {
                let (tok, next) = number(&chars, i)?;
                i = next;
                tok
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].1.is_ascii_alphanumeric() || chars[i].1 == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().map(|(_, c)| *c).collect();
                keyword(&word).ok_or_else(|| CacheError::parse(offset, format!("unexpected word '{word}'")))?
            }
            other => return Err(CacheError::parse(offset, format!("unexpected character '{other}'"))),
        };
        out.push(Token { tok, offset });
    }
    Ok(out)
}

fn next_is_digit(chars: &[(usize, char)], i: usize) -> bool {
    chars.get(i + 1).is_some_and(|(_, c)| c.is_ascii_digit())
}

fn keyword(word: &str) -> Option<Tok> {
    Some(match word.to_ascii_uppercase().as_str() {
        "TRUE" => Tok::True,
        "FALSE" => Tok::False,
        "NULL" => Tok::Null,
        "AND" => Tok::And,
        "OR" => Tok::Or,
        "NOT" => Tok::Not,
        "LIKE" => Tok::Like,
        "IS" => Tok::Is,
        "IN" => Tok::In,
        "ASC" => Tok::Asc,
        "DESC" => Tok::Desc,
        _ => return None,
    })
}

/// Single-quoted string; a doubled quote stands for one quote character.
fn quoted(chars: &[(usize, char)], open: usize) -> Result<(String, usize), CacheError> {
    let mut s = String::new();
    let mut i = open + 1;
    loop {
        match chars.get(i) {
            None => return Err(CacheError::parse(chars[open].0, "unterminated string literal")),
            Some((_, '\'')) => {
                if matches!(chars.get(i + 1), Some((_, '\''))) {
                    s.push('\'');
                    i += 2;
                } else {
                    return Ok((s, i + 1));
                }
            }
            Some((_, c)) => {
                s.push(*c);
                i += 1;
            }
        }
    }
}

fn number(chars: &[(usize, char)], start: usize) -> Result<(Tok, usize), CacheError> {
    let mut i = start;
    if chars[i].1 == '-' {
        i += 1;
    }
    let mut is_float = false;
    while i < chars.len() {
        let c = chars[i].1;
        if c.is_ascii_digit() {
            i += 1;
        } else if c == '.' && !is_float && chars.get(i + 1).is_some_and(|(_, d)| d.is_ascii_digit()) {
            is_float = true;
            i += 1;
        } else if (c == 'e' || c == 'E') && is_exponent(chars, i) {
            is_float = true;
            i += 2;
        } else {
            break;
        }
    }
    let text: String = chars[start..i].iter().map(|(_, c)| *c).collect();
    let offset = chars[start].0;
    let tok = if is_float {
        Tok::Float(text.parse::<f64>().map_err(|e| CacheError::parse(offset, format!("bad number '{text}': {e}")))?)
    } else {
        Tok::Int(text.parse::<i64>().map_err(|e| CacheError::parse(offset, format!("bad number '{text}': {e}")))?)
    };
    Ok((tok, i))
}

fn is_exponent(chars: &[(usize, char)], i: usize) -> bool {
    match chars.get(i + 1) {
        Some((_, d)) if d.is_ascii_digit() => true,
        Some((_, '+' | '-')) => chars.get(i + 2).is_some_and(|(_, d)| d.is_ascii_digit()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<Tok> {
        tokenize(s).unwrap().into_iter().map(|t| t.tok).collect()
    }

    #[test]
    fn numbers_and_signs() {
        assert_eq!(toks("-1.9 > -2"), vec![Tok::Float(-1.9), Tok::Gt, Tok::Int(-2)]);
        assert_eq!(toks("1e3"), vec![Tok::Float(1000.0)]);
    }

    #[test]
    fn keywords_case_insensitive() {
        assert_eq!(toks("true And not NULL"), vec![Tok::True, Tok::And, Tok::Not, Tok::Null]);
    }

    #[test]
    fn quotes_and_fields() {
        assert_eq!(toks("'it''s' = `$['a b']`"), vec![Tok::Str("it's".into()), Tok::Eq, Tok::Field("$['a b']".into())]);
    }

    #[test]
    fn operators() {
        assert_eq!(toks("<> != <= >= < >"), vec![Tok::Ne, Tok::Ne, Tok::Lte, Tok::Gte, Tok::Lt, Tok::Gt]);
    }

    #[test]
    fn errors_carry_offsets() {
        match tokenize("1 = 'abc") {
            Err(CacheError::Parse { offset, .. }) => assert_eq!(offset, 4),
            other => panic!("unexpected {other:?}"),
        }
        assert!(tokenize("a = 1").is_err());
        assert!(tokenize("1 ! 2").is_err());
    }
}
