const BUTTON: &str = "display: inline-block; padding: 10px 20px; background: #d62828; color: white; text-decoration: none; border-radius: 4px;";

pub fn render_invitation(rol: &str, url: &str) -> String {
    let rol = escape(rol);
    let url = escape(url);
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Te invitaron al ERP de Publicidad Vial Imagen</h2>
    <p>Tendrás acceso con el rol <strong>{rol}</strong>. Para crear tu cuenta entra a:</p>
    <p><a href="{url}" style="{BUTTON}">Aceptar invitación</a></p>
    <p style="color: #666; font-size: 14px;">El enlace vence en 7 días. Si no esperabas este correo puedes ignorarlo.</p>
</body>
</html>"#
    )
}

pub fn render_password_reset(reset_url: &str) -> String {
    let reset_url = escape(reset_url);
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Restablecer contraseña</h2>
    <p>Se pidió restablecer la contraseña de tu cuenta.</p>
    <p><a href="{reset_url}" style="{BUTTON}">Elegir nueva contraseña</a></p>
    <p style="color: #666; font-size: 14px;">El enlace vence en 1 hora. Si no lo pediste puedes ignorar este correo.</p>
</body>
</html>"#
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
