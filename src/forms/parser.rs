use axum::http::HeaderMap;
use serde_json::{Map, Value};

/// Parse a form body into a JSON object. JSON, urlencoded and multipart are
/// accepted. A missing Content-Type is treated as JSON.
pub async fn parse(headers: &HeaderMap, body: bytes::Bytes) -> Result<Value, String> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json");

    let value = if content_type.contains("multipart/form-data") {
        parse_multipart(content_type, body).await?
    } else if content_type.contains("application/x-www-form-urlencoded") {
        parse_form_urlencoded(&body)?
    } else if content_type.contains("application/json") {
        serde_json::from_slice(&body).map_err(|e| format!("JSON inválido: {e}"))?
    } else {
        return Err(format!("Content-Type no soportado: {content_type}"));
    };

    if !value.is_object() {
        return Err("El cuerpo debe ser un objeto".to_string());
    }
    Ok(value)
}

/// Repeated keys (checkbox groups) become arrays.
fn parse_form_urlencoded(body: &[u8]) -> Result<Value, String> {
    std::str::from_utf8(body).map_err(|e| format!("UTF-8 inválido: {e}"))?;

    let mut map = Map::new();
    for (k, v) in form_urlencoded::parse(body) {
        insert_repeated(&mut map, k.into_owned(), v.into_owned());
    }
    Ok(Value::Object(map))
}

async fn parse_multipart(content_type: &str, body: bytes::Bytes) -> Result<Value, String> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| "Falta el boundary de multipart".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut map = Map::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Error de multipart: {e}"))?
    {
        // File uploads are not part of any public form.
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| format!("Error leyendo campo {name}: {e}"))?;
        insert_repeated(&mut map, name, value);
    }

    Ok(Value::Object(map))
}

fn insert_repeated(map: &mut Map<String, Value>, key: String, value: String) {
    match map.get_mut(&key) {
        None => {
            map.insert(key, Value::String(value));
        }
        Some(Value::Array(items)) => items.push(Value::String(value)),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, Value::String(value)]);
        }
    }
}
