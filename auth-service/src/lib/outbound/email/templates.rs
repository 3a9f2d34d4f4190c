use auth::OtpCode;

use crate::domain::principal::models::OtpPurpose;

/// Rendered message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: &'static str,
    pub plain: String,
    pub html: String,
}

pub fn otp_subject(purpose: OtpPurpose) -> &'static str {
    match purpose {
        OtpPurpose::Registration => "Verify Your Account",
        OtpPurpose::Login => "Login Verification Code",
        OtpPurpose::PasswordReset => "Password Reset Verification Code",
    }
}

fn otp_intro(purpose: OtpPurpose) -> &'static str {
    match purpose {
        OtpPurpose::Registration => "Thank you for registering. Use the code below to verify your email address.",
        OtpPurpose::Login => "Use the code below to complete your sign in.",
        OtpPurpose::PasswordReset => "Use the code below to reset your password.",
    }
}

/// Render the one-time code message for a purpose.
pub fn render_otp(code: &OtpCode, purpose: OtpPurpose, ttl_minutes: i64) -> RenderedEmail {
    let intro = otp_intro(purpose);

    let html = format!(
        r###"<html>
    <body style="font-family: Arial, sans-serif;">
        <h2>{subject}</h2>
        <p>{intro}</p>
        <p style="font-size: 28px; font-weight: bold; letter-spacing: 6px;">{code}</p>
        <p style="color: #666; font-size: 12px;">
            This code expires in {ttl_minutes} minutes. If you didn't request it, please ignore this email.
        </p>
    </body>
</html>
"###,
        subject = otp_subject(purpose),
        code = code.as_str(),
    );

    let plain = format!(
        "{intro}\n\nYour code: {code}\n\nThis code expires in {ttl_minutes} minutes. \
         If you didn't request it, please ignore this email.",
        code = code.as_str(),
    );

    RenderedEmail {
        subject: otp_subject(purpose),
        plain,
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subjects_per_purpose() {
        assert_eq!(otp_subject(OtpPurpose::Registration), "Verify Your Account");
        assert_eq!(otp_subject(OtpPurpose::Login), "Login Verification Code");
        assert_eq!(
            otp_subject(OtpPurpose::PasswordReset),
            "Password Reset Verification Code"
        );
    }

    #[test]
    fn test_render_contains_code_and_expiry() {
        let code = OtpCode::parse("482913").unwrap();
        let email = render_otp(&code, OtpPurpose::Login, 10);

        assert!(email.html.contains("482913"));
        assert!(email.plain.contains("482913"));
        assert!(email.plain.contains("10 minutes"));
    }
}
