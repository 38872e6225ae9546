use crate::auth::otp::OtpPurpose;

pub struct OtpEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl OtpEmail {
    pub fn new(code: &str, purpose: OtpPurpose, expires_in_minutes: i64) -> Self {
        let (subject, intro) = match purpose {
            OtpPurpose::Signup => (
                "Verify your email",
                "Use this code to finish creating your account.",
            ),
            OtpPurpose::Login => ("Your login code", "Use this code to sign in."),
            OtpPurpose::PasswordReset => (
                "Reset your password",
                "Use this code to choose a new password.",
            ),
        };
        Self {
            subject: subject.to_string(),
            text: format!(
                "{}\n\nYour code is: {}\n\nIt expires in {} minutes. If you did not request it, ignore this email.",
                intro, code, expires_in_minutes
            ),
            html: format!(
                r#"<!DOCTYPE html>
<html>
<body style="font-family: sans-serif; color: #333;">
    <p>{}</p>
    <p style="font-size: 32px; font-weight: bold; letter-spacing: 6px;">{}</p>
    <p style="color: #666; font-size: 14px;">It expires in {} minutes. If you did not request it, ignore this email.</p>
</body>
</html>"#,
                intro, code, expires_in_minutes
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_contains_code_and_expiry() {
        let mail = OtpEmail::new("042917", OtpPurpose::Login, 10);
        assert_eq!(mail.subject, "Your login code");
        assert!(mail.text.contains("042917"));
        assert!(mail.text.contains("10 minutes"));
        assert!(mail.html.contains("042917"));
    }

    #[test]
    fn subject_depends_on_purpose() {
        assert_ne!(
            OtpEmail::new("1", OtpPurpose::Signup, 5).subject,
            OtpEmail::new("1", OtpPurpose::PasswordReset, 5).subject
        );
    }
}
