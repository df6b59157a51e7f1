//! Short share links: a recipe id written as lowercase hex under a fixed prefix.

use crate::error::ShortLinkError;
use crate::relations::RecipeId;

#[derive(Debug, Clone)]
pub struct ShortLinkCodec {
    prefix: String,
}

impl ShortLinkCodec {
    /// `prefix` is everything before the token, e.g. `https://example.org/s/`.
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Full share link: `prefix + hex(id) + "/"`.
    pub fn encode(&self, recipe_id: RecipeId) -> String {
        format!("{}{}/", self.prefix, encode_token(recipe_id))
    }

    pub fn decode(&self, token: &str) -> Result<RecipeId, ShortLinkError> {
        decode_token(token)
    }
}

/// Lowercase hex without padding or `0x`.
pub fn encode_token(recipe_id: RecipeId) -> String {
    format!("{:x}", recipe_id)
}

/// Parse a token produced by [`encode_token`]. A leading `0x` is tolerated.
///
/// Only lowercase hex digits are accepted, and the value must fit a positive
/// recipe id. Whether the recipe exists is not checked here.
pub fn decode_token(token: &str) -> Result<RecipeId, ShortLinkError> {
    let invalid = || ShortLinkError::InvalidToken(token.to_string());

    let digits = token.strip_prefix("0x").unwrap_or(token);
    if digits.is_empty()
        || !digits
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return Err(invalid());
    }

    let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
    RecipeId::try_from(value).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> ShortLinkCodec {
        ShortLinkCodec::new("https://foodgram.example/s/")
    }

    #[test]
    fn test_encode() {
        assert_eq!(codec().encode(31), "https://foodgram.example/s/1f/");
        assert_eq!(codec().encode(1), "https://foodgram.example/s/1/");
    }

    #[test]
    fn test_prefix_gets_trailing_slash() {
        let codec = ShortLinkCodec::new("http://localhost:3000/s");
        assert_eq!(codec.encode(255), "http://localhost:3000/s/ff/");
    }

    #[test]
    fn test_round_trip() {
        for token in ["1", "a", "ff", "1f4", "7fffffff"] {
            let id = decode_token(token).unwrap();
            assert_eq!(encode_token(id), token);
            assert_eq!(codec().encode(id), format!("{}{}/", codec().prefix(), token));
        }
    }

    #[test]
    fn test_decode_accepts_0x_prefix() {
        assert_eq!(decode_token("0x1f").unwrap(), 31);
        assert_eq!(codec().decode("0xff").unwrap(), 255);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        for token in ["zz", "", "0x", "1F", "-1", "+1", "1 ", "0x0x1", "g1"] {
            assert!(
                matches!(decode_token(token), Err(ShortLinkError::InvalidToken(_))),
                "token {:?} should be rejected",
                token
            );
        }
    }

    #[test]
    fn test_decode_rejects_out_of_range() {
        assert!(decode_token("80000000").is_err());
        assert!(decode_token("ffffffffff").is_err());
    }
}
