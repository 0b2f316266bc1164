use serde_derive::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Codes arrive either as `"123456"` or `123456`.
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(untagged)]
pub enum CodeInput {
    Text(String),
    Number(i64),
}

impl CodeInput {
    pub fn as_code(&self) -> Option<i32> {
        match self {
            CodeInput::Text(s) => s.trim().parse::<i32>().ok(),
            CodeInput::Number(n) => i32::try_from(*n).ok(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CodeInput::Text(s) if s.trim().is_empty())
    }
}

#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct VerifyCodeRequest {
    pub email: Option<String>,
    pub code: Option<CodeInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_as_string_or_number() {
        let req: VerifyCodeRequest =
            serde_json::from_str(r#"{"email":"a@b.com","code":"482913"}"#).unwrap();
        assert_eq!(req.code.as_ref().and_then(CodeInput::as_code), Some(482913));

        let req: VerifyCodeRequest =
            serde_json::from_str(r#"{"email":"a@b.com","code":482913}"#).unwrap();
        assert_eq!(req.code.as_ref().and_then(CodeInput::as_code), Some(482913));

        let req: VerifyCodeRequest =
            serde_json::from_str(r#"{"email":"a@b.com","code":"12ab"}"#).unwrap();
        assert_eq!(req.code.as_ref().and_then(CodeInput::as_code), None);
    }
}
