pub mod templates;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

/// Outgoing mail for account flows (invitations and password resets).
pub struct SystemMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SystemMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("Error de SMTP: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }

    pub async fn send_invitation(&self, to_email: &str, rol: &str, url: &str) -> Result<(), String> {
        let html = templates::render_invitation(rol, url);
        self.send(to_email, "Invitación al ERP de Publicidad Vial Imagen", &html)
            .await
    }

    pub async fn send_password_reset(&self, to_email: &str, reset_url: &str) -> Result<(), String> {
        let html = templates::render_password_reset(reset_url);
        self.send(to_email, "Restablecer contraseña - Publicidad Vial Imagen", &html)
            .await
    }

    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), String> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Remitente inválido: {e}"))?,
            )
            .to(to.parse().map_err(|e| format!("Destinatario inválido: {e}"))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| format!("No se pudo armar el correo: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("No se pudo enviar el correo: {e}"))?;

        Ok(())
    }
}
