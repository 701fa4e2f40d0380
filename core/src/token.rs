//! The bot credential.

use std::fmt;

use crate::error::ClientError;

/// Bearer token identifying the calling bot.
///
/// Validated once at construction and immutable afterwards. `Debug` and
/// `Display` print a masked form so the token can appear in logs safely.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(token: impl Into<String>) -> Result<Self, ClientError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ClientError::InvalidToken("token is empty"));
        }
        if !token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '-' | '_'))
        {
            return Err(ClientError::InvalidToken(
                "token may only contain ASCII letters, digits, ':', '-' and '_'",
            ));
        }
        Ok(Self(token))
    }

    /// The raw token. Only URL construction should need this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&mask_token(&self.0)).finish()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&mask_token(&self.0))
    }
}

/// Mask a token for logging: first 4 chars + `***` + last 4 chars.
/// Tokens of 11 chars or fewer are fully masked.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}***{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_token() {
        assert!(matches!(Token::new(""), Err(ClientError::InvalidToken(_))));
    }

    #[test]
    fn rejects_characters_outside_token_alphabet() {
        assert!(Token::new("123/456").is_err());
        assert!(Token::new("123 456").is_err());
        assert!(Token::new("123456\n").is_err());
        assert!(Token::new("123456:abc?x=1").is_err());
        assert!(Token::new("123456:ABC-def_789").is_ok());
    }

    #[test]
    fn short_tokens_are_fully_masked() {
        assert_eq!(mask_token(""), "***");
        assert_eq!(mask_token("12345:abcde"), "***");
    }

    #[test]
    fn long_tokens_show_head_and_tail() {
        assert_eq!(mask_token("123456:ABC-DEF1234ghIkl"), "1234***hIkl");
    }

    #[test]
    fn debug_and_display_never_expose_the_token() {
        let token = Token::new("123456:ABC-DEF1234ghIkl").unwrap();
        assert_eq!(token.expose(), "123456:ABC-DEF1234ghIkl");
        assert_eq!(token.to_string(), "1234***hIkl");
        assert_eq!(format!("{token:?}"), "Token(\"1234***hIkl\")");
    }
}
