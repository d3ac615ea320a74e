//! Evaluation of MSBuild `Condition` attributes.
//!
//! Supports quoted and unquoted operands, `==`, `!=`, `!`, `and`, `or`,
//! parentheses and the `Exists(..)` / `HasTrailingSlash(..)` functions.
//! Operand comparison ignores case.

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Value(String),
    Word(String),
    Eq,
    NotEq,
    Not,
    Open,
    Close,
}

/// Evaluates `condition`, expanding properties with `expand` and checking
/// file existence with `exists`.
///
/// An empty condition is true.
///
/// # Errors
/// Returns a description of the problem when the condition uses syntax this
/// evaluator does not understand
pub fn evaluate(
    condition: &str,
    expand: &dyn Fn(&str) -> String,
    exists: &dyn Fn(&str) -> bool,
) -> Result<bool, String> {
    if condition.trim().is_empty() {
        return Ok(true);
    }

    let tokens = tokenize(condition)?;
    let mut parser = Parser {
        tokens,
        position: 0,
        expand,
        exists,
    };
    let value = parser.or_expression()?;
    if parser.position != parser.tokens.len() {
        return Err(format!("unexpected input in condition \"{}\"", condition));
    }
    Ok(value)
}

fn tokenize(condition: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = condition.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '\'' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => value.push(ch),
                        None => return Err(format!("unterminated quote in condition \"{}\"", condition)),
                    }
                }
                tokens.push(Token::Value(value));
            }
            '=' | '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(if c == '=' { Token::Eq } else { Token::NotEq });
                } else if c == '!' {
                    tokens.push(Token::Not);
                } else {
                    return Err(format!("single '=' in condition \"{}\"", condition));
                }
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '<' | '>' => {
                return Err(format!("relational operators are not supported in \"{}\"", condition));
            }
            _ => {
                let mut word = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch == '$' {
                        // $(Name) is one operand even though it contains parentheses
                        word.push(ch);
                        chars.next();
                        if chars.peek() == Some(&'(') {
                            for inner in chars.by_ref() {
                                word.push(inner);
                                if inner == ')' {
                                    break;
                                }
                            }
                        }
                    } else if ch.is_alphanumeric() || matches!(ch, '_' | '.' | '-' | ':' | '/' | '\\') {
                        word.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if word.is_empty() {
                    return Err(format!("unexpected character '{}' in condition \"{}\"", c, condition));
                }
                tokens.push(Token::Word(word));
            }
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    expand: &'a dyn Fn(&str) -> String,
    exists: &'a dyn Fn(&str) -> bool,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(word)) if word.eq_ignore_ascii_case(keyword))
    }

    fn or_expression(&mut self) -> Result<bool, String> {
        let mut value = self.and_expression()?;
        while self.peek_keyword("or") {
            self.position += 1;
            let right = self.and_expression()?;
            value = value || right;
        }
        Ok(value)
    }

    fn and_expression(&mut self) -> Result<bool, String> {
        let mut value = self.unary()?;
        while self.peek_keyword("and") {
            self.position += 1;
            let right = self.unary()?;
            value = value && right;
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<bool, String> {
        if self.peek() == Some(&Token::Not) {
            self.position += 1;
            return Ok(!self.unary()?);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<bool, String> {
        if self.peek() == Some(&Token::Open) {
            self.position += 1;
            let value = self.or_expression()?;
            return match self.next() {
                Some(Token::Close) => Ok(value),
                _ => Err("missing ')'".to_string()),
            };
        }

        if let (Some(Token::Word(name)), Some(Token::Open)) =
            (self.tokens.get(self.position), self.tokens.get(self.position + 1))
        {
            let name = name.clone();
            self.position += 2;
            let argument = self.operand()?;
            if self.next() != Some(Token::Close) {
                return Err(format!("missing ')' after {}(", name));
            }
            return match name.to_ascii_lowercase().as_str() {
                "exists" => Ok(!argument.trim().is_empty() && (self.exists)(argument.trim())),
                "hastrailingslash" => Ok(argument.ends_with('/') || argument.ends_with('\\')),
                _ => Err(format!("function {} is not supported", name)),
            };
        }

        let left = self.operand()?;
        match self.peek() {
            Some(Token::Eq) => {
                self.position += 1;
                let right = self.operand()?;
                Ok(left.eq_ignore_ascii_case(&right))
            }
            Some(Token::NotEq) => {
                self.position += 1;
                let right = self.operand()?;
                Ok(!left.eq_ignore_ascii_case(&right))
            }
            _ => match left.to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" => Ok(true),
                "false" | "off" | "no" => Ok(false),
                other => Err(format!("'{}' is not a boolean", other)),
            },
        }
    }

    fn operand(&mut self) -> Result<String, String> {
        match self.next() {
            Some(Token::Value(raw)) | Some(Token::Word(raw)) => Ok((self.expand)(&raw)),
            other => Err(format!("expected an operand, found {:?}", other)),
        }
    }
}
