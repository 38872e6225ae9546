use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{MailError, Mailer, OtpEmail};
use crate::{auth::otp::OtpPurpose, config::MailConfig};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(cfg: &MailConfig) -> Result<Self, MailError> {
        let host = cfg.smtp_host.as_str();
        let mut builder = if cfg.smtp_tls {
            let tls = TlsParameters::new(host.to_string())
                .map_err(|e| MailError::InvalidConfig(format!("tls: {}", e)))?;
            // 465 is implicit TLS, anything else upgrades with STARTTLS
            if cfg.smtp_port == 465 {
                AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                    .map_err(|e| MailError::InvalidConfig(e.to_string()))?
                    .port(cfg.smtp_port)
                    .tls(Tls::Wrapper(tls))
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                    .map_err(|e| MailError::InvalidConfig(e.to_string()))?
                    .port(cfg.smtp_port)
                    .tls(Tls::Required(tls))
            }
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(cfg.smtp_port)
        };

        if let (Some(user), Some(pass)) = (&cfg.smtp_username, &cfg.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let from = match &cfg.from_name {
            Some(name) => format!("{} <{}>", name, cfg.from_address),
            None => cfg.from_address.clone(),
        };

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_otp(
        &self,
        to: &str,
        code: &str,
        purpose: OtpPurpose,
        expires_in_minutes: i64,
    ) -> Result<(), MailError> {
        let content = OtpEmail::new(code, purpose, expires_in_minutes);

        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| MailError::InvalidConfig(format!("from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| MailError::SendFailed(format!("to address: {}", e)))?)
            .subject(content.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(content.text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(content.html),
                    ),
            )
            .map_err(|e| MailError::SendFailed(format!("build message: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::SendFailed(e.to_string()))?;
        Ok(())
    }
}
