use lettre::message::{Mailbox, header::ContentType};

pub const VERIFICATION_CODE_EMAIL: &str = include_str!("./verification_code.html");
pub const VERIFICATION_CODE_SUBJECT: &str = "Your Verification Code";

pub struct VerificationCodeEmail {
    pub email: String,
}

impl Default for VerificationCodeEmail {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationCodeEmail {
    pub fn new() -> Self {
        VerificationCodeEmail {
            email: VERIFICATION_CODE_EMAIL.to_string(),
        }
    }

    pub fn set_code(mut self, code: i32) -> Self {
        self.email = self.email.replace("$1", &code.to_string());
        self
    }

    pub fn to_message(self, from: &Mailbox, user_email: &str) -> anyhow::Result<lettre::Message> {
        Ok(lettre::Message::builder()
            .from(from.clone())
            .to(user_email.parse::<Mailbox>()?)
            .subject(VERIFICATION_CODE_SUBJECT)
            .header(ContentType::TEXT_HTML)
            .body(self.email)?)
    }
}
